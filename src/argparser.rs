use std::{fmt::Debug, net::IpAddr, str::FromStr};

use log::LevelFilter;

use mini_was::config::{ServerConfig, DEFAULT_IP, DEFAULT_PORT, DEFAULT_WORKER_POOL_SIZE};

//  Parameters
const IPPARAMETER: &str = "--ip";
const PORTPARAMETER: &str = "--port";
const THREADPOOLSIZEPARAMETER: &str = "--threadpoolsize";
const LOGLEVELPARAMETER: &str = "--loglevel";
const HELPPARAMETER: &str = "--help";
const DEFAULTLOGLEVEL: LevelFilter = LevelFilter::Info;

//  The help text to display when --help is given
pub static HELP: &str = "\
Minimal web application server.\n\
--ip\t\t\tIp address to listen on. Defaults to 127.0.0.1.\n\
--port\t\t\tPort to listen on. Defaults to 8080.\n\
--threadpoolsize\tNumber of worker threads. Defaults to 10.\n\
--loglevel\t\tLog level to use. Defaults to Info.\n\
--help\t\t\tDisplay this help and exit.";

//  Checks for the --help argument
pub fn has_help_arg(args: &[String]) -> bool {
    args.iter().any(|x| x == HELPPARAMETER)
}

//  Builds the server configuration from the arguments, falling back to defaults
pub fn get_config_from_args(args: &[String]) -> Result<ServerConfig, String> {
    let ip = get_parameter_or_default::<IpAddr>(args, IPPARAMETER, DEFAULT_IP, "Ip parameter given but not an ip address")?;
    let port = get_parameter_or_default::<u16>(args, PORTPARAMETER, DEFAULT_PORT, "Port parameter given but not a port number")?;
    let worker_pool_size = get_parameter_or_default::<usize>(
        args,
        THREADPOOLSIZEPARAMETER,
        DEFAULT_WORKER_POOL_SIZE,
        "Threadpoolsize parameter given but not an usize",
    )?;

    if worker_pool_size == 0 {
        return Err(format!("Threadpoolsize must be greater than zero\r\n{}", HELP));
    }

    Ok(ServerConfig::new(port, worker_pool_size).with_ip(ip))
}

//  Gets the --loglevel argument, or Info when absent
pub fn get_loglevel_from_args(args: &[String]) -> Result<LevelFilter, String> {
    get_parameter_or_default::<LevelFilter>(args, LOGLEVELPARAMETER, DEFAULTLOGLEVEL, "Loglevel parameter given but not a log level")
}

fn get_parameter_or_default<T: FromStr>(args: &[String], parameter: &str, default: T, errormessage: &str) -> Result<T, String>
where
    <T as FromStr>::Err: Debug,
{
    if args.iter().any(|x| x == parameter) {
        return get_parameter_variable_from_args::<T>(args, parameter, errormessage);
    }

    Ok(default)
}

//  Finds the parameter and parses the value that follows it
fn get_parameter_variable_from_args<T: FromStr>(args: &[String], parameter: &str, errormessage: &str) -> Result<T, String>
where
    <T as FromStr>::Err: Debug,
{
    let value = args
        .iter()
        .position(|x| x == parameter)
        .and_then(|index| args.get(index + 1))
        .ok_or_else(|| format!("Parameter value not found {}\r\n{}", parameter, HELP))?;

    value.parse::<T>().map_err(|_| format!("{}\r\n{}", errormessage, HELP))
}
