use nu_ansi_term::Color::{Blue, Cyan, Green};
use tracing::info;
use vitrine_core::{
    categories,
    models::{CategoriaUpdate, NovaCategoria},
    AppContext, CoreResult,
};

use crate::{
    cli::CategoryAction,
    utils::{json_enabled, or_dash, print_json, print_table, Colored},
};

pub async fn handle_category_action(ctx: &AppContext, action: CategoryAction) -> CoreResult<()> {
    match action {
        CategoryAction::List => {
            let categorias = categories::list_categories(ctx).await?;
            if json_enabled() {
                return print_json(&categorias);
            }

            let rows = categorias
                .iter()
                .map(|c| {
                    [
                        format!("{}", Colored(Cyan, &c.id)),
                        format!("{}", Colored(Blue, &c.nome)),
                        format!("{}", Colored(Green, &c.slug)),
                        or_dash(c.descricao.as_deref()).to_string(),
                    ]
                })
                .collect();
            print_table("Categories", ["ID", "Name", "Slug", "Description"], rows);
        }
        CategoryAction::Create {
            nome,
            slug,
            descricao,
        } => {
            let categoria = NovaCategoria {
                slug: slug.unwrap_or_default(),
                descricao,
                ..NovaCategoria::new(nome)
            };
            let categoria = categories::create_category(ctx, categoria).await?;
            if json_enabled() {
                return print_json(&categoria);
            }
            info!(
                "Created category {} as {} ({})",
                Colored(Blue, &categoria.nome),
                Colored(Green, &categoria.slug),
                Colored(Cyan, &categoria.id)
            );
        }
        CategoryAction::Update {
            id,
            nome,
            slug,
            descricao,
        } => {
            let changes = CategoriaUpdate {
                nome,
                slug,
                descricao: descricao.map(Some),
            };
            categories::update_category(ctx, &id, changes).await?;
            info!("Category {} updated", Colored(Cyan, &id));
        }
        CategoryAction::Delete {
            id,
        } => {
            categories::delete_category(ctx, &id).await?;
            info!("Category {} deleted", Colored(Cyan, &id));
        }
    }
    Ok(())
}
