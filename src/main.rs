use std::{env, process};

use log::{error, info};

use mini_was::{logger, Connector, ProtocolHandlerFactory};

mod argparser;

//  Prints the error and exits the program
//  Used for invalid arguments, before the logger exists
fn throw_error(e: &str) -> ! {
    eprintln!("Error: {}", e);
    process::exit(-1);
}

fn main() {
    let args = env::args().collect::<Vec<String>>();

    if argparser::has_help_arg(&args) {
        println!("{}", argparser::HELP);
        process::exit(0);
    }

    let loglevel = argparser::get_loglevel_from_args(&args).unwrap_or_else(|e| throw_error(&e));
    let config = argparser::get_config_from_args(&args).unwrap_or_else(|e| throw_error(&e));

    if let Err(e) = logger::init(loglevel) {
        throw_error(&e.to_string());
    }

    let mut connector = Connector::new(config, ProtocolHandlerFactory::default());
    if let Err(e) = connector.start() {
        error!("Error: {}", e);
        process::exit(1);
    }

    info!("Serving on {}", connector.local_addr().unwrap_or_else(|| config.socket_addr()));
    connector.join();
}
