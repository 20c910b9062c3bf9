use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed};
use tracing::info;
use vitrine_core::{
    models::{NovoProduto, Produto, ProdutoUpdate},
    products, AppContext, CoreResult,
};

use crate::{
    cli::{ProductAction, ProductFields},
    utils::{json_enabled, or_dash, print_json, print_record, print_table, Colored},
};

pub async fn handle_product_action(ctx: &AppContext, action: ProductAction) -> CoreResult<()> {
    match action {
        ProductAction::List {
            categoria,
        } => list_products(ctx, categoria.as_deref()).await,
        ProductAction::Show {
            id,
        } => show_product(ctx, &id).await,
        ProductAction::Create {
            fields,
            images,
        } => create_product(ctx, fields, images).await,
        ProductAction::Update {
            id,
            nome,
            descricao,
            preco,
            estoque,
            categoria,
            images,
        } => {
            let changes = ProdutoUpdate {
                nome,
                descricao: descricao.map(|d| Some(d).filter(|d| !d.trim().is_empty())),
                preco,
                estoque,
                categoria_id: categoria.map(|c| Some(c).filter(|c| !c.trim().is_empty())),
            };
            products::update_product(ctx, &id, changes, images.as_deref()).await?;
            info!("Product {} updated", Colored(Cyan, &id));
            Ok(())
        }
        ProductAction::Delete {
            id,
        } => {
            products::delete_product(ctx, &id).await?;
            info!("Product {} deleted", Colored(Cyan, &id));
            Ok(())
        }
    }
}

fn price(preco: f64) -> String {
    format!("R$ {preco:.2}")
}

async fn list_products(ctx: &AppContext, categoria: Option<&str>) -> CoreResult<()> {
    let produtos = products::list_products(ctx, categoria).await?;
    if json_enabled() {
        return print_json(&produtos);
    }

    let rows = produtos
        .iter()
        .map(|p: &Produto| {
            [
                format!("{}", Colored(Cyan, &p.id)),
                format!("{}", Colored(Blue, &p.nome)),
                format!("{}", Colored(LightRed, price(p.preco))),
                p.estoque.to_string(),
                or_dash(p.categoria_id.as_deref()).to_string(),
            ]
        })
        .collect();
    print_table("Products", ["ID", "Name", "Price", "Stock", "Category"], rows);
    Ok(())
}

async fn show_product(ctx: &AppContext, id: &str) -> CoreResult<()> {
    let detalhado = products::get_product_with_images(ctx, id).await?;
    if json_enabled() {
        return print_json(&detalhado);
    }

    let produto = &detalhado.produto;
    let mut fields = vec![
        ("ID", format!("{}", Colored(Cyan, &produto.id))),
        ("Name", format!("{}", Colored(Blue, &produto.nome))),
        ("Description", or_dash(produto.descricao.as_deref()).to_string()),
        ("Price", format!("{}", Colored(LightRed, price(produto.preco)))),
        ("Stock", produto.estoque.to_string()),
        (
            "Category",
            detalhado
                .categoria
                .as_ref()
                .map(|c| format!("{}", Colored(Green, &c.nome)))
                .unwrap_or_else(|| "-".into()),
        ),
        ("Created", or_dash(produto.created_at.as_deref()).to_string()),
    ];
    for imagem in &detalhado.imagens {
        fields.push(("Image", format!("[{}] {}", imagem.ordem, imagem.url)));
    }
    print_record("Product", fields);
    Ok(())
}

async fn create_product(
    ctx: &AppContext,
    fields: ProductFields,
    images: Vec<String>,
) -> CoreResult<()> {
    let novo = NovoProduto {
        nome: fields.nome,
        descricao: fields.descricao,
        preco: fields.preco,
        estoque: fields.estoque,
        categoria_id: fields.categoria,
    };
    let detalhado = products::create_product(ctx, novo, &images).await?;
    if json_enabled() {
        return print_json(&detalhado);
    }

    info!(
        "Created product {} ({}) with {} images",
        Colored(Blue, &detalhado.produto.nome),
        Colored(Cyan, &detalhado.produto.id),
        detalhado.imagens.len()
    );
    Ok(())
}
