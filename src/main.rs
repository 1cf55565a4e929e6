use std::process::ExitCode;

use log::debug;

use sky_vars::config::{Config, STATION_SCRIPT};
use sky_vars::ephemeris::Vsop87Ephemeris;
use sky_vars::error::SkyError;
use sky_vars::location::LocationResolver;
use sky_vars::snapshot::publish;

const UNRESOLVED_EXIT: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::discover()?;
    debug!("config: {:?}", config);

    let location = match LocationResolver::from_config(&config).resolve() {
        Ok(location) => location,
        Err(SkyError::LocationUnavailable {
            lat_var, lon_var, ..
        }) => {
            println!("ERROR: Couldn't determine {lat_var}/{lon_var}.");
            println!(
                "Fix: ensure {STATION_SCRIPT} outputs lat lon, or run with {lat_var}=.. {lon_var}=.."
            );
            return Ok(ExitCode::from(UNRESOLVED_EXIT));
        }
        Err(e) => return Err(e.into()),
    };

    let now = chrono::Utc::now();
    publish(&Vsop87Ephemeris::new(), location, &now, &config.output_path)?;
    println!("{}", config.output_path.display());
    Ok(ExitCode::SUCCESS)
}
