use tracing::{debug, warn};
use vitrine_rest::Direction;

use crate::{
    categories::find_category,
    error::{CoreError, CoreResult},
    images::{check_image_count, insert_images, list_images, replace_images},
    models::{NovoProduto, Produto, ProdutoDetalhado, ProdutoUpdate, PRODUTOS},
    validate::Validate,
    AppContext,
};

/// Lists products, newest first, optionally restricted to one category.
pub async fn list_products(
    ctx: &AppContext,
    categoria_id: Option<&str>,
) -> CoreResult<Vec<Produto>> {
    let mut query = ctx
        .client()
        .from(PRODUTOS)
        .select("*")
        .order("created_at", Direction::Desc);
    if let Some(categoria_id) = categoria_id {
        query = query.eq("categoria_id", categoria_id);
    }
    Ok(query.execute().await?)
}

pub async fn get_product(ctx: &AppContext, id: &str) -> CoreResult<Produto> {
    ctx.client()
        .from(PRODUTOS)
        .select("*")
        .eq("id", id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "produto", id))
}

/// Loads a product, its images in display order and its category.
pub async fn get_product_with_images(ctx: &AppContext, id: &str) -> CoreResult<ProdutoDetalhado> {
    let produto = get_product(ctx, id).await?;
    let imagens = list_images(ctx, Some(&produto.id)).await?;
    let categoria = match produto.categoria_id.as_deref() {
        Some(categoria_id) => find_category(ctx, categoria_id).await?,
        None => None,
    };

    Ok(ProdutoDetalhado {
        produto,
        categoria,
        imagens,
    })
}

/// Creates a product and attaches `image_urls` as its images, in order.
///
/// The product row is kept when inserting the images fails.
pub async fn create_product(
    ctx: &AppContext,
    novo: NovoProduto,
    image_urls: &[String],
) -> CoreResult<ProdutoDetalhado> {
    novo.validate()?;
    check_image_count(ctx, image_urls)?;

    let produto: Produto = ctx
        .client()
        .from(PRODUTOS)
        .insert(novo)
        .select("*")
        .single()
        .await?;
    debug!(id = %produto.id, nome = %produto.nome, "product created");

    let imagens = insert_images(ctx, &produto.id, image_urls)
        .await
        .inspect_err(|err| warn!(id = %produto.id, "product created without images: {err}"))?;
    let categoria = match produto.categoria_id.as_deref() {
        Some(categoria_id) => find_category(ctx, categoria_id).await?,
        None => None,
    };

    Ok(ProdutoDetalhado {
        produto,
        categoria,
        imagens,
    })
}

/// Applies `changes` and, when `image_urls` is given, replaces the product's
/// images with them.
pub async fn update_product(
    ctx: &AppContext,
    id: &str,
    changes: ProdutoUpdate,
    image_urls: Option<&[String]>,
) -> CoreResult<()> {
    changes.validate()?;
    if let Some(urls) = image_urls {
        check_image_count(ctx, urls)?;
    }

    if changes.is_empty() {
        debug!(id, "no product fields to update");
    } else {
        ctx.client()
            .from(PRODUTOS)
            .update(changes)
            .eq("id", id)
            .await?;
    }

    if let Some(urls) = image_urls {
        replace_images(ctx, id, urls)
            .await
            .inspect_err(|err| warn!(id, "product updated but images were not replaced: {err}"))?;
    }
    Ok(())
}

pub async fn delete_product(ctx: &AppContext, id: &str) -> CoreResult<()> {
    ctx.client().from(PRODUTOS).delete().eq("id", id).await?;
    debug!(id, "product deleted");
    Ok(())
}
