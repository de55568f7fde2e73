//! Rendering of operation results for the terminal.
//!
//! Everything here writes to a caller-supplied writer so the data-producing code in
//! [`crate::keystore`] never prints. Human output shows the base64 secret only for a
//! freshly created wallet; JSON output carries it for create and import.

use crate::{
    amount::Sol,
    keystore::{CreatedWallet, ImportedWallet, WalletListing},
};
use eyre::Context as _;
use serde_json::json;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

fn write_json(out: &mut impl Write, v: &serde_json::Value) -> eyre::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize output")?;
    writeln!(out, "{s}").context("write output")?;
    Ok(())
}

pub fn created_json(w: &CreatedWallet) -> serde_json::Value {
    json!({
        "file": w.file_name,
        "path": w.file_path,
        "publicKey": w.record.public_key,
        "secretKeyBase64": w.secret_key.to_base64(),
        "createdAt": w.record.created_at,
        "network": w.record.network,
        "balance": w.balance.to_string(),
    })
}

pub fn listing_json(ws: &[WalletListing]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = ws
        .iter()
        .map(|w| {
            json!({
                "file": w.file_name,
                "publicKey": w.public_key,
                "balance": w.balance.to_string(),
                "createdAt": w.created_at,
            })
        })
        .collect();
    json!({ "wallets": items })
}

pub fn imported_json(w: &ImportedWallet) -> serde_json::Value {
    json!({
        "publicKey": w.public_key,
        "secretKeyBase64": w.secret_key.to_base64(),
        "createdAt": w.created_at,
        "balance": w.balance.to_string(),
    })
}

pub fn print_created(
    out: &mut impl Write,
    w: &CreatedWallet,
    fmt: OutputFormat,
) -> eyre::Result<()> {
    if fmt == OutputFormat::Json {
        return write_json(out, &created_json(w));
    }
    writeln!(
        out,
        "\n=== Wallet created ===\nWallet file: {}\nPublic key: {}\nSecret key (base64): {}\nBalance: {} SOL",
        w.file_name, w.record.public_key, w.record.secret_key_base64, w.balance
    )
    .context("write created wallet")?;
    Ok(())
}

pub fn print_listing(
    out: &mut impl Write,
    ws: &[WalletListing],
    fmt: OutputFormat,
) -> eyre::Result<()> {
    if fmt == OutputFormat::Json {
        return write_json(out, &listing_json(ws));
    }
    writeln!(out, "\n=== Wallets ===").context("write listing")?;
    if ws.is_empty() {
        writeln!(out, "(none)").context("write listing")?;
    }
    for (i, w) in ws.iter().enumerate() {
        writeln!(
            out,
            "\n{}. {}\n   Public key: {}\n   Balance: {} SOL\n   Created at: {}",
            i + 1,
            w.file_name,
            w.public_key,
            w.balance,
            w.created_at
        )
        .context("write listing")?;
    }
    Ok(())
}

pub fn print_imported(
    out: &mut impl Write,
    w: &ImportedWallet,
    fmt: OutputFormat,
) -> eyre::Result<()> {
    if fmt == OutputFormat::Json {
        return write_json(out, &imported_json(w));
    }
    writeln!(
        out,
        "\n=== Wallet imported ===\nPublic key: {}\nCreated at: {}\nBalance: {} SOL",
        w.public_key, w.created_at, w.balance
    )
    .context("write imported wallet")?;
    Ok(())
}

pub fn print_balance(
    out: &mut impl Write,
    public_key: &str,
    balance: Sol,
    fmt: OutputFormat,
) -> eyre::Result<()> {
    if fmt == OutputFormat::Json {
        return write_json(
            out,
            &json!({ "publicKey": public_key, "balance": balance.to_string() }),
        );
    }
    writeln!(out, "{public_key}: {balance} SOL").context("write balance")?;
    Ok(())
}
