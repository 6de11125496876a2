//! CLI submission client — `formgate send`.
//!
//! Counterpart of the website's form handler: posts a submission to a
//! running gateway and reports the outcome.

use anyhow::{Context, Result};
use serde_json::json;

pub async fn cmd_send(
    gateway: &str,
    message: &str,
    name: &str,
    email: &str,
    phone: &str,
    subject: &str,
) -> Result<()> {
    let url = format!("{}/api/contact", gateway.trim_end_matches('/'));
    let payload = json!({
        "name": name.trim(),
        "email": email.trim(),
        "phone": phone.trim(),
        "subject": subject.trim(),
        "message": message.trim(),
        "hp": "",
    });

    let resp = reqwest::Client::new()
        .post(&url)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("Failed to reach gateway at {url}"))?;

    let status = resp.status();
    let body: serde_json::Value = resp
        .json()
        .await
        .context("Gateway returned a non-JSON response")?;

    if status.is_success() && body["success"] == true {
        println!("Message sent.");
        if let Some(url) = body["url"].as_str() {
            println!("Filed as {url}");
        }
        Ok(())
    } else {
        let error = body["error"].as_str().unwrap_or("Failed to send message.");
        anyhow::bail!("{} ({})", error, status);
    }
}
