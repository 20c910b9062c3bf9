use nu_ansi_term::Color::{Blue, Cyan, Green};
use tracing::info;
use vitrine_core::{
    contacts,
    models::{ContatoSimplesUpdate, NovoContatoSimples},
    AppContext, CoreResult,
};

use crate::{
    cli::ContactAction,
    utils::{json_enabled, or_dash, print_json, print_record, print_table, Colored},
};

pub async fn handle_contact_action(ctx: &AppContext, action: ContactAction) -> CoreResult<()> {
    match action {
        ContactAction::List => {
            let contatos = contacts::list_contacts(ctx).await?;
            if json_enabled() {
                return print_json(&contatos);
            }

            let rows = contatos
                .iter()
                .map(|c| {
                    [
                        format!("{}", Colored(Cyan, &c.id)),
                        format!("{}", Colored(Blue, &c.nome)),
                        format!("{}", Colored(Green, &c.email)),
                        or_dash(c.numero.as_deref()).to_string(),
                    ]
                })
                .collect();
            print_table("Contacts", ["ID", "Name", "Email", "Phone"], rows);
        }
        ContactAction::Show {
            id,
        } => {
            let contato = contacts::get_contact(ctx, &id).await?;
            if json_enabled() {
                return print_json(&contato);
            }
            print_record(
                "Contact",
                vec![
                    ("ID", format!("{}", Colored(Cyan, &contato.id))),
                    ("Name", format!("{}", Colored(Blue, &contato.nome))),
                    ("Email", format!("{}", Colored(Green, &contato.email))),
                    ("Phone", or_dash(contato.numero.as_deref()).to_string()),
                    ("Notes", or_dash(contato.observacao.as_deref()).to_string()),
                    ("Created", or_dash(contato.created_at.as_deref()).to_string()),
                    ("Updated", or_dash(contato.updated_at.as_deref()).to_string()),
                ],
            );
        }
        ContactAction::Create {
            nome,
            email,
            numero,
            observacao,
        } => {
            let contato = contacts::create_contact(
                ctx,
                NovoContatoSimples {
                    nome,
                    email,
                    numero,
                    observacao,
                },
            )
            .await?;
            if json_enabled() {
                return print_json(&contato);
            }
            info!(
                "Created contact {} ({})",
                Colored(Blue, &contato.nome),
                Colored(Cyan, &contato.id)
            );
        }
        ContactAction::Update {
            id,
            nome,
            email,
            numero,
            observacao,
        } => {
            let changes = ContatoSimplesUpdate {
                nome,
                email,
                numero: numero.map(Some),
                observacao: observacao.map(Some),
                updated_at: None,
            };
            contacts::update_contact(ctx, &id, changes).await?;
            info!("Contact {} updated", Colored(Cyan, &id));
        }
        ContactAction::Delete {
            id,
        } => {
            contacts::delete_contact(ctx, &id).await?;
            info!("Contact {} deleted", Colored(Cyan, &id));
        }
    }
    Ok(())
}
