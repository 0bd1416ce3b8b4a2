use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::{Args, Subcommand};
use contactbook_core::AuthStatus;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Print the current authorization status
    Status(AuthStatusArgs),
    /// Ask for access to contacts, prompting if needed
    Request(AuthRequestArgs),
}

#[derive(Debug, Args)]
pub struct AuthStatusArgs {}

#[derive(Debug, Args)]
pub struct AuthRequestArgs {}

pub fn status(ctx: &Context<'_>, _args: AuthStatusArgs) -> Result<()> {
    let status = ctx.book.get_auth_status()?;
    print_status(ctx, status)
}

pub fn request(ctx: &Context<'_>, _args: AuthRequestArgs) -> Result<()> {
    let status = ctx.book.request_auth_status()?;
    print_status(ctx, status)
}

fn print_status(ctx: &Context<'_>, status: AuthStatus) -> Result<()> {
    if ctx.json {
        return print_json(&serde_json::json!({ "status": status }));
    }
    println!("{}", status);
    Ok(())
}
