use std::path::Path;

use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use tracing::{info, warn};
use vitrine_core::{
    models::NovoContato,
    quotes,
    upload::ImageFile,
    AppContext, CoreResult,
};

use crate::{
    cli::QuoteAction,
    utils::{json_enabled, or_dash, print_json, print_record, print_table, Colored},
};

pub async fn handle_quote_action(ctx: &AppContext, action: QuoteAction) -> CoreResult<()> {
    match action {
        QuoteAction::List => {
            let pedidos = quotes::list_quotes(ctx).await?;
            if json_enabled() {
                return print_json(&pedidos);
            }

            let rows = pedidos
                .iter()
                .map(|q| {
                    [
                        format!("{}", Colored(Cyan, &q.id)),
                        format!("{}", Colored(Blue, &q.nome)),
                        format!("{}", Colored(Green, &q.email)),
                        q.arquivos.len().to_string(),
                        or_dash(q.created_at.as_deref()).to_string(),
                    ]
                })
                .collect();
            print_table("Quotes", ["ID", "Name", "Email", "Files", "Received"], rows);
        }
        QuoteAction::Show {
            id,
        } => {
            let pedido = quotes::get_quote(ctx, &id).await?;
            if json_enabled() {
                return print_json(&pedido);
            }

            let mut fields = vec![
                ("ID", format!("{}", Colored(Cyan, &pedido.id))),
                ("Name", format!("{}", Colored(Blue, &pedido.nome))),
                ("Email", format!("{}", Colored(Green, &pedido.email))),
                ("Message", pedido.mensagem.clone()),
                ("Received", or_dash(pedido.created_at.as_deref()).to_string()),
            ];
            for arquivo in &pedido.arquivos {
                fields.push(("File", arquivo.clone()));
            }
            print_record("Quote", fields);
        }
        QuoteAction::Submit {
            nome,
            email,
            mensagem,
            attachments,
        } => {
            let files = attachments
                .iter()
                .map(|path| ImageFile::from_path(Path::new(path)))
                .collect::<CoreResult<Vec<_>>>()?;
            let novo = NovoContato {
                nome,
                email,
                mensagem,
                arquivos: Vec::new(),
            };

            let submitted = quotes::submit_quote(ctx, novo, files).await?;
            if json_enabled() {
                return print_json(&submitted);
            }
            for skipped in &submitted.skipped {
                warn!(
                    "Attachment {} was not sent: {}",
                    Colored(Yellow, &skipped.name),
                    skipped.reason
                );
            }
            info!(
                "Quote {} received with {} attachments",
                Colored(Cyan, &submitted.contato.id),
                submitted.contato.arquivos.len()
            );
        }
        QuoteAction::Delete {
            id,
        } => {
            quotes::delete_quote(ctx, &id).await?;
            info!("Quote {} deleted", Colored(Cyan, &id));
        }
    }
    Ok(())
}
