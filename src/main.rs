use frontdoor::FrontdoorError;

fn main() {
    if let Err(err) = frontdoor::cli::run_cli() {
        eprintln!("Error: {:#}", err);
        let code = err.downcast_ref::<FrontdoorError>().map(FrontdoorError::exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}
