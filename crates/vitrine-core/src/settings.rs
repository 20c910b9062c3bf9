use tracing::debug;

use crate::{
    error::CoreResult,
    models::{Configuracoes, ConfiguracoesInput, CONFIGURACOES},
    timestamp,
    validate::Validate,
    AppContext,
};

/// Loads the settings row, `None` when the table is empty.
pub async fn load_settings(ctx: &AppContext) -> CoreResult<Option<Configuracoes>> {
    Ok(ctx
        .client()
        .from(CONFIGURACOES)
        .select("*")
        .limit(1)
        .maybe_single()
        .await?)
}

/// Saves the settings, updating the existing row or creating the first one.
pub async fn save_settings(ctx: &AppContext, input: ConfiguracoesInput) -> CoreResult<Configuracoes> {
    let input = ConfiguracoesInput {
        updated_at: Some(timestamp()),
        ..input.normalized()
    };
    input.validate()?;

    let saved: Configuracoes = match load_settings(ctx).await? {
        Some(current) => {
            ctx.client()
                .from(CONFIGURACOES)
                .update(input)
                .eq("id", &current.id)
                .await?;
            ctx.client()
                .from(CONFIGURACOES)
                .select("*")
                .eq("id", &current.id)
                .single()
                .await?
        }
        None => {
            ctx.client()
                .from(CONFIGURACOES)
                .insert(input)
                .select("*")
                .single()
                .await?
        }
    };
    debug!(id = %saved.id, "settings saved");
    Ok(saved)
}
