use anyhow::Result;
use serde_json::{Value, json};

use crate::auth::{self, StoredCredentials};
use crate::cli::{LoginArgs, RegisterArgs, ResetPasswordArgs, SendCodeArgs};
use crate::output;
use crate::transport::{LOGIN_PATH, RequestOptions, Transport, TransportError};

pub async fn login(server: &str, args: &LoginArgs, profile: &str) -> Result<()> {
    let transport = Transport::with_tokens(server, profile, None)?;
    let envelope = transport
        .post::<Value>(
            LOGIN_PATH,
            &json!({ "account": args.account, "password": args.password }),
            RequestOptions::default(),
        )
        .await?;

    let data = envelope.data.unwrap_or(Value::Null);
    let (Some(access), Some(refresh)) = (
        data.get("accessToken").and_then(Value::as_str),
        data.get("refreshToken").and_then(Value::as_str),
    ) else {
        anyhow::bail!("login response did not include a token pair");
    };

    auth::save_credentials(
        profile,
        &StoredCredentials {
            server: server.trim_end_matches('/').to_string(),
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        },
    )?;
    output::print_success(&format!("logged in as {}", args.account));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if auth::remove_credentials(profile)? {
        output::print_success("logged out");
    } else {
        println!("No stored credentials for profile '{profile}'");
    }
    Ok(())
}

pub fn whoami(profile: &str) -> Result<()> {
    match auth::load_credentials(profile)? {
        Some(creds) => {
            println!("Profile: {profile}");
            println!("Server:  {}", creds.server);
            println!("Status:  logged in");
        }
        None => {
            println!("Profile: {profile}");
            println!("Status:  not logged in");
        }
    }
    Ok(())
}

pub async fn send_code(server: &str, args: &SendCodeArgs, profile: &str) -> Result<()> {
    let transport = Transport::new(server, profile)?;
    let result = transport
        .post::<Value>(
            "/api/auth/send-code",
            &json!({ "scene": args.scene, "email": args.email }),
            RequestOptions { silent: true },
        )
        .await;

    match result {
        Ok(envelope) => {
            output::print_success(&envelope.message);
            Ok(())
        }
        Err(e) => Err(render_field_error(e, "sending the code failed")),
    }
}

pub async fn register(server: &str, args: &RegisterArgs, profile: &str) -> Result<()> {
    let transport = Transport::with_tokens(server, profile, None)?;
    let result = transport
        .post::<Value>(
            "/api/auth/register",
            &json!({
                "username": args.username,
                "email": args.email,
                "password": args.password,
                "code": args.code,
            }),
            RequestOptions { silent: true },
        )
        .await;

    match result {
        Ok(_) => {
            output::print_success(&format!(
                "account '{}' created; log in with: gitboard login",
                args.username
            ));
            Ok(())
        }
        Err(e) => Err(render_field_error(e, "registration failed")),
    }
}

pub async fn reset_password(server: &str, args: &ResetPasswordArgs, profile: &str) -> Result<()> {
    let transport = Transport::new(server, profile)?;
    let result = transport
        .post::<Value>(
            "/api/auth/reset-password",
            &json!({
                "email": args.email,
                "code": args.code,
                "password": args.password,
            }),
            RequestOptions { silent: true },
        )
        .await;

    match result {
        Ok(envelope) => {
            output::print_success(&envelope.message);
            Ok(())
        }
        Err(e) => Err(render_field_error(e, "password reset failed")),
    }
}

/// Silent requests render their own failure, pointing at the offending
/// field when the server named one.
fn render_field_error(err: TransportError, prefix: &str) -> anyhow::Error {
    if let TransportError::Api {
        ref message,
        ref field,
        ..
    } = err
    {
        match field {
            Some(field) => output::print_error(&format!("{prefix} ({field}): {message}")),
            None => output::print_error(&format!("{prefix}: {message}")),
        }
    }
    err.into()
}
