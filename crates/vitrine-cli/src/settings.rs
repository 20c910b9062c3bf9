use nu_ansi_term::Color::{Blue, Cyan};
use tracing::{info, warn};
use vitrine_core::{
    models::{Configuracoes, ConfiguracoesInput},
    settings, AppContext, CoreResult,
};

use crate::{
    cli::SettingsAction,
    utils::{json_enabled, or_dash, print_json, print_record, Colored},
};

pub async fn handle_settings_action(ctx: &AppContext, action: SettingsAction) -> CoreResult<()> {
    match action {
        SettingsAction::Show => {
            let Some(configuracoes) = settings::load_settings(ctx).await? else {
                if json_enabled() {
                    return print_json(&Option::<Configuracoes>::None);
                }
                warn!("No settings saved yet");
                return Ok(());
            };
            if json_enabled() {
                return print_json(&configuracoes);
            }
            show_settings(&configuracoes);
        }
        SettingsAction::Save {
            nome_empresa,
            logo_url,
            telefone,
            endereco,
            email_contato,
            horario_funcionamento,
            cor_primaria,
            cor_secundaria,
            cor_destaque,
        } => {
            let input = ConfiguracoesInput {
                nome_empresa,
                logo_url,
                telefone,
                endereco,
                email_contato,
                horario_funcionamento,
                cor_primaria,
                cor_secundaria,
                cor_destaque,
                updated_at: None,
            };
            let saved = settings::save_settings(ctx, input).await?;
            if json_enabled() {
                return print_json(&saved);
            }
            info!(
                "Settings for {} saved ({})",
                Colored(Blue, &saved.nome_empresa),
                Colored(Cyan, &saved.id)
            );
        }
    }
    Ok(())
}

fn show_settings(c: &Configuracoes) {
    print_record(
        "Settings",
        vec![
            ("Company", format!("{}", Colored(Blue, &c.nome_empresa))),
            ("Logo", or_dash(c.logo_url.as_deref()).to_string()),
            ("Phone", or_dash(c.telefone.as_deref()).to_string()),
            ("Address", or_dash(c.endereco.as_deref()).to_string()),
            ("Email", or_dash(c.email_contato.as_deref()).to_string()),
            ("Opening hours", or_dash(c.horario_funcionamento.as_deref()).to_string()),
            ("Primary color", or_dash(c.cor_primaria.as_deref()).to_string()),
            ("Secondary color", or_dash(c.cor_secundaria.as_deref()).to_string()),
            ("Accent color", or_dash(c.cor_destaque.as_deref()).to_string()),
            ("Updated", or_dash(c.updated_at.as_deref()).to_string()),
        ],
    );
}
