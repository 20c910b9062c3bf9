use serde_json::json;
use tracing::debug;
use vitrine_rest::Direction;
use vitrine_utils::error::ValidationError;

use crate::{
    error::{CoreError, CoreResult},
    models::{ImagemUpdate, NovaImagem, ProdutoImagem, PRODUTO_IMAGENS},
    validate::Validate,
    AppContext,
};

const WITH_PRODUCT: &str = "
    *,
    produto:produtos(id, nome)
";

/// Lists images, newest first, or the images of one product in display order.
pub async fn list_images(
    ctx: &AppContext,
    produto_id: Option<&str>,
) -> CoreResult<Vec<ProdutoImagem>> {
    let query = ctx.client().from(PRODUTO_IMAGENS).select(WITH_PRODUCT);
    let query = match produto_id {
        Some(produto_id) => {
            query
                .eq("produto_id", produto_id)
                .order("ordem", Direction::Asc)
        }
        None => query.order("created_at", Direction::Desc),
    };
    Ok(query.execute().await?)
}

pub async fn get_image(ctx: &AppContext, id: &str) -> CoreResult<ProdutoImagem> {
    ctx.client()
        .from(PRODUTO_IMAGENS)
        .select(WITH_PRODUCT)
        .eq("id", id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "imagem", id))
}

fn check_position(ctx: &AppContext, ordem: i64) -> CoreResult<()> {
    let max = ctx.config().max_images() as i64;
    if ordem >= max {
        return Err(ValidationError::OutOfRange {
            field: "ordem",
            min: 0,
            max: max - 1,
        }
        .into());
    }
    Ok(())
}

pub async fn add_image(ctx: &AppContext, imagem: NovaImagem) -> CoreResult<ProdutoImagem> {
    imagem.validate()?;
    check_position(ctx, imagem.ordem)?;

    let current = list_images(ctx, Some(&imagem.produto_id)).await?;
    if current.len() >= ctx.config().max_images() {
        return Err(CoreError::TooManyImages {
            max: ctx.config().max_images(),
        });
    }

    let row: ProdutoImagem = ctx
        .client()
        .from(PRODUTO_IMAGENS)
        .insert(imagem)
        .select("*")
        .single()
        .await?;
    debug!(id = %row.id, produto_id = %row.produto_id, "image added");
    Ok(row)
}

pub async fn update_image(ctx: &AppContext, id: &str, changes: ImagemUpdate) -> CoreResult<()> {
    changes.validate()?;
    if let Some(ordem) = changes.ordem {
        check_position(ctx, ordem)?;
    }
    ctx.client()
        .from(PRODUTO_IMAGENS)
        .update(changes)
        .eq("id", id)
        .await?;
    Ok(())
}

pub async fn delete_image(ctx: &AppContext, id: &str) -> CoreResult<()> {
    ctx.client()
        .from(PRODUTO_IMAGENS)
        .delete()
        .eq("id", id)
        .await?;
    Ok(())
}

/// Inserts `urls` as the images of a product, numbering `ordem` from zero.
pub(crate) async fn insert_images(
    ctx: &AppContext,
    produto_id: &str,
    urls: &[String],
) -> CoreResult<Vec<ProdutoImagem>> {
    if urls.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(ordem, url)| json!({"produto_id": produto_id, "url": url, "ordem": ordem}))
        .collect();
    let inserted = ctx
        .client()
        .from(PRODUTO_IMAGENS)
        .insert(rows)
        .select("*")
        .execute()
        .await?;
    Ok(inserted)
}

/// Replaces every image of a product with `urls`, in order.
pub async fn replace_images(
    ctx: &AppContext,
    produto_id: &str,
    urls: &[String],
) -> CoreResult<Vec<ProdutoImagem>> {
    check_image_count(ctx, urls)?;
    ctx.client()
        .from(PRODUTO_IMAGENS)
        .delete()
        .eq("produto_id", produto_id)
        .await?;
    insert_images(ctx, produto_id, urls).await
}

pub(crate) fn check_image_count(ctx: &AppContext, urls: &[String]) -> CoreResult<()> {
    let max = ctx.config().max_images();
    if urls.len() > max {
        return Err(CoreError::TooManyImages { max });
    }
    if let Some(pos) = urls.iter().position(|url| url.trim().is_empty()) {
        debug!(pos, "blank image url");
        return Err(ValidationError::Empty { field: "url" }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;
    use vitrine_config::config::Config;
    use vitrine_rest::{memory::MemoryBackend, RestError};

    use super::*;

    fn context(backend: &Arc<MemoryBackend>) -> AppContext {
        AppContext::with_client(Config::default(), backend.client())
    }

    fn seed(backend: &MemoryBackend) {
        backend.seed(
            PRODUTO_IMAGENS,
            vec![
                json!({"id": 1, "produto_id": 7, "url": "https://cdn/b.png", "ordem": 1, "created_at": "2024-05-01T10:00:00Z"}),
                json!({"id": 2, "produto_id": 7, "url": "https://cdn/a.png", "ordem": 0, "created_at": "2024-05-02T10:00:00Z"}),
                json!({"id": 3, "produto_id": 8, "url": "https://cdn/c.png", "ordem": 0, "created_at": "2024-05-03T10:00:00Z"}),
            ],
        );
    }

    #[tokio::test]
    async fn test_list_images_of_product_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        seed(&backend);
        let ctx = context(&backend);

        let imagens = list_images(&ctx, Some("7")).await.unwrap();
        let urls: Vec<_> = imagens.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["https://cdn/a.png", "https://cdn/b.png"]);

        let request = backend.last_request().unwrap();
        assert_eq!(
            request.query_pairs(),
            vec![
                ("select", "*%2Cproduto%3Aprodutos(id%2Cnome)"),
                ("produto_id", "eq.7"),
                ("order", "ordem.asc"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_all_images_newest_first() {
        let backend = Arc::new(MemoryBackend::new());
        seed(&backend);
        let ctx = context(&backend);

        let ids: Vec<_> = list_images(&ctx, None)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["3", "2", "1"]);
    }

    #[tokio::test]
    async fn test_get_missing_image() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let err = get_image(&ctx, "42").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "imagem", .. }));
    }

    #[tokio::test]
    async fn test_add_image_enforces_limits() {
        let backend = Arc::new(MemoryBackend::new());
        seed(&backend);
        let config = Config {
            max_images: Some(2),
            ..Config::default()
        };
        let ctx = AppContext::with_client(config, backend.client());

        let err = add_image(
            &ctx,
            NovaImagem {
                produto_id: "8".into(),
                url: "https://cdn/d.png".into(),
                ordem: 2,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { field: "ordem", min: 0, max: 1 })
        ));

        let err = add_image(
            &ctx,
            NovaImagem {
                produto_id: "7".into(),
                url: "https://cdn/d.png".into(),
                ordem: 1,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::TooManyImages { max: 2 }));

        let added = add_image(
            &ctx,
            NovaImagem {
                produto_id: "8".into(),
                url: "https://cdn/d.png".into(),
                ordem: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(added.produto_id, "8");
        assert_eq!(added.ordem, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_image() {
        let backend = Arc::new(MemoryBackend::new());
        seed(&backend);
        let ctx = context(&backend);

        update_image(
            &ctx,
            "1",
            ImagemUpdate {
                ordem: Some(3),
                ..ImagemUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(backend.rows(PRODUTO_IMAGENS)[0]["ordem"], 3);

        delete_image(&ctx, "1").await.unwrap();
        assert_eq!(backend.rows(PRODUTO_IMAGENS).len(), 2);
    }

    #[tokio::test]
    async fn test_replace_images() {
        let backend = Arc::new(MemoryBackend::new());
        seed(&backend);
        let ctx = context(&backend);

        let urls = vec!["https://cdn/x.png".to_string(), "https://cdn/y.png".to_string()];
        let inserted = replace_images(&ctx, "7", &urls).await.unwrap();
        assert_eq!(inserted.len(), 2);

        let rows: Vec<Value> = backend
            .rows(PRODUTO_IMAGENS)
            .into_iter()
            .filter(|r| r["produto_id"] == json!("7"))
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["url"], "https://cdn/x.png");
        assert_eq!(rows[0]["ordem"], 0);
        assert_eq!(rows[1]["ordem"], 1);
        assert_eq!(
            backend
                .rows(PRODUTO_IMAGENS)
                .iter()
                .filter(|r| r["produto_id"] == json!(8))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_replace_images_rejects_too_many_before_any_request() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let urls: Vec<String> = (0..6).map(|i| format!("https://cdn/{i}.png")).collect();
        let err = replace_images(&ctx, "7", &urls).await.unwrap_err();
        assert!(matches!(err, CoreError::TooManyImages { max: 5 }));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let ctx = AppContext::with_client(Config::default(), vitrine_rest::Client::unconfigured());
        let err = list_images(&ctx, None).await.unwrap_err();
        assert!(matches!(err, CoreError::Rest(RestError::NotConfigured)));
    }
}
