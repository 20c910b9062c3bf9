//! Back-office accounts: sign-up behind an admin password, login against
//! salted SHA-256 digests and profile changes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use vitrine_utils::{
    hash::{constant_time_eq, digest_password, generate_salt, verify_password},
    validate::{require_email, require_min_len, require_non_empty},
};

use crate::{
    error::{CoreError, CoreResult},
    models::{Usuario, USUARIOS},
    timestamp, AppContext,
};

pub const MIN_PASSWORD_LEN: usize = 6;

const PUBLIC_COLUMNS: &str = "id, nome, email, created_at, updated_at";
const CREDENTIAL_COLUMNS: &str = "id, nome, email, senha_hash, salt";

#[derive(Serialize)]
struct NovoUsuario<'a> {
    nome: &'a str,
    email: &'a str,
    senha_hash: String,
    salt: String,
}

#[derive(Deserialize)]
struct Credenciais {
    #[serde(flatten)]
    usuario: Usuario,
    senha_hash: String,
    salt: String,
}

/// Creates an account when `admin_password` matches the configured sign-up
/// password.
pub async fn create_account(
    ctx: &AppContext,
    nome: &str,
    email: &str,
    senha: &str,
    admin_password: &str,
) -> CoreResult<Usuario> {
    let expected = ctx
        .config()
        .admin_signup_password()
        .ok_or(CoreError::SignupDisabled)?;

    let (nome, email) = (nome.trim(), email.trim());
    if !constant_time_eq(admin_password.as_bytes(), expected.as_bytes()) {
        warn!(email, "sign-up attempt with a wrong admin password");
        return Err(CoreError::InvalidAdminPassword);
    }

    require_non_empty("nome", nome)?;
    require_non_empty("email", email)?;
    require_non_empty("senha", senha)?;
    require_email(email)?;
    require_min_len("senha", senha, MIN_PASSWORD_LEN)?;

    let existing: Option<Value> = ctx
        .client()
        .from(USUARIOS)
        .select("id")
        .eq("email", email)
        .maybe_single()
        .await?;
    if existing.is_some() {
        return Err(CoreError::EmailTaken(email.to_string()));
    }

    let salt = generate_salt();
    let usuario: Usuario = ctx
        .client()
        .from(USUARIOS)
        .insert(NovoUsuario {
            nome,
            email,
            senha_hash: digest_password(senha, &salt),
            salt,
        })
        .select(PUBLIC_COLUMNS)
        .single()
        .await?;
    debug!(id = %usuario.id, email, "account created");
    Ok(usuario)
}

/// Checks an email and password pair. Unknown emails and wrong passwords are
/// reported the same way.
pub async fn authenticate(ctx: &AppContext, email: &str, senha: &str) -> CoreResult<Usuario> {
    let email = email.trim();
    require_non_empty("email", email)?;
    require_non_empty("senha", senha)?;

    let credenciais: Option<Credenciais> = ctx
        .client()
        .from(USUARIOS)
        .select(CREDENTIAL_COLUMNS)
        .eq("email", email)
        .maybe_single()
        .await?;

    match credenciais {
        Some(c) if verify_password(senha, &c.salt, &c.senha_hash) => {
            debug!(id = %c.usuario.id, "login succeeded");
            Ok(c.usuario)
        }
        Some(_) | None => {
            debug!(email, "login rejected");
            Err(CoreError::InvalidCredentials)
        }
    }
}

pub async fn get_user(ctx: &AppContext, id: &str) -> CoreResult<Usuario> {
    ctx.client()
        .from(USUARIOS)
        .select(PUBLIC_COLUMNS)
        .eq("id", id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "usuário", id))
}

/// Renames an account and returns it as stored.
pub async fn update_profile(ctx: &AppContext, user_id: &str, nome: &str) -> CoreResult<Usuario> {
    let nome = nome.trim();
    require_non_empty("nome", nome)?;

    ctx.client()
        .from(USUARIOS)
        .update(json!({"nome": nome, "updated_at": timestamp()}))
        .eq("id", user_id)
        .await?;
    debug!(id = user_id, "profile updated");
    get_user(ctx, user_id).await
}

/// Replaces an account password after checking the current one. The new
/// password gets a fresh salt.
pub async fn change_password(
    ctx: &AppContext,
    user_id: &str,
    atual: &str,
    nova: &str,
    confirmacao: &str,
) -> CoreResult<()> {
    require_non_empty("senha_atual", atual)?;
    require_non_empty("nova_senha", nova)?;
    if nova != confirmacao {
        return Err(CoreError::PasswordMismatch);
    }
    require_min_len("nova_senha", nova, MIN_PASSWORD_LEN)?;

    let credenciais: Credenciais = ctx
        .client()
        .from(USUARIOS)
        .select(CREDENTIAL_COLUMNS)
        .eq("id", user_id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "usuário", user_id))?;
    if !verify_password(atual, &credenciais.salt, &credenciais.senha_hash) {
        warn!(id = user_id, "password change with a wrong current password");
        return Err(CoreError::InvalidCredentials);
    }

    let salt = generate_salt();
    let senha_hash = digest_password(nova, &salt);
    ctx.client()
        .from(USUARIOS)
        .update(json!({
            "senha_hash": senha_hash,
            "salt": salt,
            "updated_at": timestamp(),
        }))
        .eq("id", user_id)
        .await?;
    debug!(id = user_id, "password changed");
    Ok(())
}
