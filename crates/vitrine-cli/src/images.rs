use std::path::Path;

use nu_ansi_term::Color::{Blue, Cyan, Yellow};
use tracing::{info, warn};
use vitrine_core::{
    images,
    models::{ImagemUpdate, NovaImagem, ProdutoImagem},
    upload::{self, ImageFile},
    AppContext, CoreResult,
};

use crate::{
    cli::ImageAction,
    utils::{json_enabled, print_json, print_table, Colored},
};

pub async fn handle_image_action(ctx: &AppContext, action: ImageAction) -> CoreResult<()> {
    match action {
        ImageAction::List {
            produto,
        } => {
            let imagens = images::list_images(ctx, produto.as_deref()).await?;
            if json_enabled() {
                return print_json(&imagens);
            }

            let rows = imagens
                .iter()
                .map(|i| {
                    [
                        format!("{}", Colored(Cyan, &i.id)),
                        i.produto
                            .as_ref()
                            .map(|p| format!("{}", Colored(Blue, &p.nome)))
                            .unwrap_or_else(|| i.produto_id.clone()),
                        i.ordem.to_string(),
                        i.url.clone(),
                    ]
                })
                .collect();
            print_table("Images", ["ID", "Product", "Position", "URL"], rows);
        }
        ImageAction::Upload {
            produto,
            files,
        } => upload_images(ctx, &produto, &files).await?,
        ImageAction::Add {
            produto,
            url,
            ordem,
        } => {
            let imagem = images::add_image(
                ctx,
                NovaImagem {
                    produto_id: produto,
                    url,
                    ordem,
                },
            )
            .await?;
            if json_enabled() {
                return print_json(&imagem);
            }
            info!("Added image {}", Colored(Cyan, &imagem.id));
        }
        ImageAction::Reorder {
            id,
            ordem,
        } => {
            let changes = ImagemUpdate {
                ordem: Some(ordem),
                ..ImagemUpdate::default()
            };
            images::update_image(ctx, &id, changes).await?;
            info!("Image {} moved to position {}", Colored(Cyan, &id), ordem);
        }
        ImageAction::Remove {
            id,
            keep_file,
        } => {
            let imagem = images::get_image(ctx, &id).await?;
            images::delete_image(ctx, &id).await?;
            if !keep_file {
                upload::remove_uploaded_image(ctx, &imagem.url)
                    .await
                    .inspect_err(|err| warn!("Stored file was not removed: {err}"))?;
            }
            info!("Image {} removed", Colored(Cyan, &id));
        }
    }
    Ok(())
}

async fn upload_images(ctx: &AppContext, produto: &str, paths: &[String]) -> CoreResult<()> {
    let files = paths
        .iter()
        .map(|path| ImageFile::from_path(Path::new(path)))
        .collect::<CoreResult<Vec<_>>>()?;

    let existing = images::list_images(ctx, Some(produto)).await?.len();
    let report = upload::upload_images(ctx, existing, files).await?;

    let mut added: Vec<ProdutoImagem> = Vec::with_capacity(report.urls.len());
    for (offset, url) in report.urls.iter().enumerate() {
        let imagem = images::add_image(
            ctx,
            NovaImagem {
                produto_id: produto.to_string(),
                url: url.clone(),
                ordem: (existing + offset) as i64,
            },
        )
        .await?;
        added.push(imagem);
    }

    if json_enabled() {
        return print_json(&serde_json::json!({
            "images": added,
            "failures": report.failures,
        }));
    }

    for failure in &report.failures {
        warn!(
            "{} was not uploaded: {}",
            Colored(Yellow, &failure.name),
            failure.reason
        );
    }
    info!(
        "Uploaded {} of {} images to product {}",
        added.len(),
        paths.len(),
        Colored(Cyan, produto)
    );
    Ok(())
}
