//! CLI module for the HiringGo user service
//!
//! - `serve`: run the HTTP API
//! - `token`: issue a token with the configured signing key

pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

/// HiringGo User Service - authentication and user management
#[derive(Parser)]
#[command(name = "hiringgo-user-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Issue a signed token and print it
    Token(token::TokenArgs),
}
