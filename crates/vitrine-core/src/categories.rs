use tracing::debug;
use vitrine_rest::Direction;

use crate::{
    error::{CoreError, CoreResult},
    models::{Categoria, CategoriaUpdate, NovaCategoria, CATEGORIAS},
    validate::Validate,
    AppContext,
};

pub async fn list_categories(ctx: &AppContext) -> CoreResult<Vec<Categoria>> {
    Ok(ctx
        .client()
        .from(CATEGORIAS)
        .select("*")
        .order("nome", Direction::Asc)
        .execute()
        .await?)
}

pub async fn get_category(ctx: &AppContext, id: &str) -> CoreResult<Categoria> {
    ctx.client()
        .from(CATEGORIAS)
        .select("*")
        .eq("id", id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "categoria", id))
}

/// Looks a category up by id, `None` when it does not exist.
pub(crate) async fn find_category(ctx: &AppContext, id: &str) -> CoreResult<Option<Categoria>> {
    Ok(ctx
        .client()
        .from(CATEGORIAS)
        .select("*")
        .eq("id", id)
        .maybe_single()
        .await?)
}

pub async fn create_category(ctx: &AppContext, categoria: NovaCategoria) -> CoreResult<Categoria> {
    let categoria = categoria.normalized();
    categoria.validate()?;

    let row: Categoria = ctx
        .client()
        .from(CATEGORIAS)
        .insert(categoria)
        .select("*")
        .single()
        .await?;
    debug!(id = %row.id, slug = %row.slug, "category created");
    Ok(row)
}

pub async fn update_category(
    ctx: &AppContext,
    id: &str,
    changes: CategoriaUpdate,
) -> CoreResult<()> {
    let changes = changes.normalized();
    changes.validate()?;
    ctx.client()
        .from(CATEGORIAS)
        .update(changes)
        .eq("id", id)
        .await?;
    Ok(())
}

pub async fn delete_category(ctx: &AppContext, id: &str) -> CoreResult<()> {
    ctx.client().from(CATEGORIAS).delete().eq("id", id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use vitrine_config::config::Config;
    use vitrine_rest::memory::MemoryBackend;
    use vitrine_utils::error::ValidationError;

    use super::*;

    fn context(backend: &Arc<MemoryBackend>) -> AppContext {
        AppContext::with_client(Config::default(), backend.client())
    }

    #[tokio::test]
    async fn test_list_categories_by_name() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            CATEGORIAS,
            vec![
                json!({"id": 1, "nome": "Salas", "slug": "salas"}),
                json!({"id": 2, "nome": "Cozinhas", "slug": "cozinhas"}),
            ],
        );
        let ctx = context(&backend);

        let nomes: Vec<_> = list_categories(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.nome)
            .collect();
        assert_eq!(nomes, ["Cozinhas", "Salas"]);
        assert_eq!(
            backend.last_request().unwrap().query_pairs(),
            vec![("select", "*"), ("order", "nome.asc")]
        );
    }

    #[tokio::test]
    async fn test_create_category_derives_slug() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let categoria = create_category(&ctx, NovaCategoria::new("Mesas & Cadeiras"))
            .await
            .unwrap();
        assert_eq!(categoria.slug, "mesas-cadeiras");
        assert_eq!(backend.rows(CATEGORIAS)[0]["slug"], "mesas-cadeiras");
    }

    #[tokio::test]
    async fn test_create_category_rejects_empty_name() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let err = create_category(&ctx, NovaCategoria::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Empty { field: "nome" })
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_update_delete_category() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(CATEGORIAS, vec![json!({"id": 1, "nome": "Salas", "slug": "salas"})]);
        let ctx = context(&backend);

        update_category(
            &ctx,
            "1",
            CategoriaUpdate {
                slug: Some("Sala de Estar".into()),
                ..CategoriaUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(get_category(&ctx, "1").await.unwrap().slug, "sala-de-estar");

        delete_category(&ctx, "1").await.unwrap();
        assert!(matches!(
            get_category(&ctx, "1").await,
            Err(CoreError::NotFound { entity: "categoria", .. })
        ));
        assert!(find_category(&ctx, "1").await.unwrap().is_none());
    }
}
