use nu_ansi_term::Color::{Blue, Cyan, Green, Red};
use serde_json::json;
use tracing::info;
use vitrine_core::{
    auth,
    guard::{route_guard, RouteDecision},
    session, AppContext, CoreResult,
};

use crate::{
    cli::{ProfileAction, SessionAction},
    utils::{json_enabled, print_json, value_or_ask, Colored},
};

pub async fn signup(
    ctx: &AppContext,
    nome: &str,
    email: &str,
    senha: Option<String>,
    admin_password: Option<String>,
) -> CoreResult<()> {
    let senha = value_or_ask(senha, "Password: ")?;
    let admin_password = value_or_ask(admin_password, "Admin sign-up password: ")?;

    let usuario = auth::create_account(ctx, nome, email, &senha, &admin_password).await?;
    if json_enabled() {
        return print_json(&usuario);
    }
    info!(
        "Account {} created for {}",
        Colored(Cyan, &usuario.id),
        Colored(Blue, &usuario.email)
    );
    Ok(())
}

pub async fn login(ctx: &AppContext, email: &str, senha: Option<String>) -> CoreResult<()> {
    let senha = value_or_ask(senha, "Password: ")?;

    let usuario = auth::authenticate(ctx, email, &senha).await?;
    let token = session::issue_session(ctx, &usuario)?;
    if json_enabled() {
        return print_json(&json!({
            "user": usuario,
            "token": token.to_string(),
            "expires_at": token.expires_at,
        }));
    }
    info!("Logged in as {}", Colored(Blue, &usuario.nome));
    info!("{token}");
    Ok(())
}

pub async fn handle_session_action(ctx: &AppContext, action: SessionAction) -> CoreResult<()> {
    match action {
        SessionAction::Verify {
            token,
        } => {
            let user_id = session::verify_session(ctx, &token)?;
            let usuario = auth::get_user(ctx, &user_id).await?;
            if json_enabled() {
                return print_json(&usuario);
            }
            info!(
                "Valid session for {} ({})",
                Colored(Blue, &usuario.email),
                Colored(Cyan, &usuario.id)
            );
        }
        SessionAction::Route {
            path,
            token,
        } => {
            let decision = route_guard(&path, token.as_deref(), ctx.config().session_secret());
            if json_enabled() {
                return print_json(&json!({
                    "path": path,
                    "allowed": decision == RouteDecision::Allow,
                    "redirect": decision.location(),
                }));
            }
            match decision.location() {
                None => info!("{} {}", Colored(Green, "allow"), path),
                Some(location) => info!("{} {} -> {}", Colored(Red, "redirect"), path, location),
            }
        }
    }
    Ok(())
}

pub async fn handle_profile_action(ctx: &AppContext, action: ProfileAction) -> CoreResult<()> {
    match action {
        ProfileAction::Update {
            token,
            nome,
        } => {
            let user_id = session::verify_session(ctx, &token)?;
            let usuario = auth::update_profile(ctx, &user_id, &nome).await?;
            if json_enabled() {
                return print_json(&usuario);
            }
            info!("Profile renamed to {}", Colored(Blue, &usuario.nome));
        }
        ProfileAction::Password {
            token,
            atual,
            nova,
            confirmacao,
        } => {
            let user_id = session::verify_session(ctx, &token)?;
            let atual = value_or_ask(atual, "Current password: ")?;
            let nova = value_or_ask(nova, "New password: ")?;
            let confirmacao = value_or_ask(confirmacao, "Confirm new password: ")?;

            auth::change_password(ctx, &user_id, &atual, &nova, &confirmacao).await?;
            if json_enabled() {
                return print_json(&json!({"id": user_id, "password_changed": true}));
            }
            info!("Password changed for {}", Colored(Cyan, &user_id));
        }
    }
    Ok(())
}
