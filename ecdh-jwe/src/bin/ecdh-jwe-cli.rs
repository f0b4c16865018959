//! Binary entrypoint for the ECDH-ES JWE CLI tool
//!
//! Decrypts compact JWEs with a private EC JWK and prints protected headers.

use ecdh_jwe::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
