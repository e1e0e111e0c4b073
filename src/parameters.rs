use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, Error, Subcommand, ValueEnum};
use http::Uri;

use crate::credentials::Environment;
use crate::http::config::{DEFAULT_HTTP_TIMEOUT, HttpConfig, TlsVerification};
use crate::manager::http_impl::{DEFAULT_STORE_DIR, ManagerSettings};
use crate::store::Slot;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prints a usable token for the slot, re-authenticating when the cached one is rejected.
    ///
    /// Credentials are read from TOKEN_CACHE_<ENV>_{CLIENT_ID,CLIENT_SECRET,USERNAME,PASSWORD}
    /// (a `.env` file in the working directory is loaded first). Exits with an error when no
    /// usable token could be obtained; the empty token is still written to the slot.
    #[command(name = "retrieve")]
    RetrieveToken {
        #[command(flatten)]
        slot_args: SlotArgs,

        /// Environment whose credentials and TLS policy apply
        #[arg(long, short, value_enum, required = true)]
        environment: Environment,

        #[command(flatten)]
        endpoints: ServiceEndpoints,

        #[command(flatten)]
        http_args: HttpArgs,

        /// Extra authentication attempts after a failed one
        #[arg(long, default_value_t = 0)]
        retries: u8,

        /// Select format how the Token should be printed
        #[arg(long, value_enum, default_value = "Plain")]
        output_token_format: OutPutTokenFormat,
    },
    /// Prints the token currently cached in the slot without contacting the service.
    #[command(name = "inspect")]
    Inspect {
        #[command(flatten)]
        slot_args: SlotArgs,

        /// Select format how the Token should be printed
        #[arg(long, value_enum, default_value = "Plain")]
        output_token_format: OutPutTokenFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutPutTokenFormat {
    /// Only the raw access token
    #[value(name = "Plain")]
    Plain,
    /// Slot, token and diagnostics in json format
    #[value(name = "Json")]
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct SlotArgs {
    /// Name of the cached token, e.g. the service it belongs to
    #[arg(long, short, required = true)]
    pub slot: String,

    /// Directory holding one `<slot>.txt` file per slot
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServiceEndpoints {
    /// Endpoint probed with the cached token to check it is still accepted
    #[arg(long, required = true)]
    pub validation_url: String,

    /// OAuth2 token endpoint used for the password grant
    #[arg(long, required = true)]
    pub token_url: String,
}

#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Skip TLS certificate verification. Only accepted with `--environment testing`
    #[arg(long, default_value_t = false)]
    pub insecure_skip_tls_verify: bool,

    /// Timeout in seconds applied to every request
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl From<&HttpArgs> for HttpConfig {
    fn from(args: &HttpArgs) -> Self {
        let timeout = Duration::from_secs(args.timeout_secs);
        HttpConfig::new(
            timeout,
            timeout,
            TlsVerification::from(args.insecure_skip_tls_verify),
        )
    }
}

pub fn select_slot(slot_args: &SlotArgs) -> Result<Slot, Error> {
    Slot::try_from(slot_args.slot.as_str())
        .map_err(|e| Error::raw(ErrorKind::InvalidValue, format!("{e}\n")))
}

pub fn parse_uri(name: &str, value: &str) -> Result<Uri, Error> {
    let uri: Uri = value
        .parse()
        .map_err(|e| Error::raw(ErrorKind::Format, format!("Invalid {name} URI: {e}\n")))?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(Error::raw(
            ErrorKind::Format,
            format!("Invalid {name} URI: `{value}` must be absolute\n"),
        ));
    }
    Ok(uri)
}

pub fn create_manager_settings(
    slot_args: &SlotArgs,
    environment: Environment,
    endpoints: &ServiceEndpoints,
    http_args: &HttpArgs,
) -> Result<ManagerSettings, Error> {
    let settings = ManagerSettings::new(
        select_slot(slot_args)?,
        parse_uri("validation", &endpoints.validation_url)?,
        parse_uri("token", &endpoints.token_url)?,
        environment,
    )
    .with_store_dir(slot_args.store_dir.clone())
    .with_http_config(HttpConfig::from(http_args));

    Ok(settings)
}
