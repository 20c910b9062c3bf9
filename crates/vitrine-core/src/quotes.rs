//! Quote requests ("orçamentos") from the public contact form.

use serde::Serialize;
use tracing::{debug, warn};
use vitrine_rest::Direction;

use crate::{
    error::{CoreError, CoreResult},
    models::{Contato, NovoContato, CONTATOS},
    upload::{upload_attachment, ImageFile, UploadFailure},
    validate::Validate,
    AppContext,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmittedQuote {
    pub contato: Contato,
    /// Attachments that could not be stored; the quote is sent without them.
    pub skipped: Vec<UploadFailure>,
}

/// Stores a quote request, uploading its attachments first.
///
/// An attachment that fails to upload is skipped; the request itself is still
/// stored.
pub async fn submit_quote(
    ctx: &AppContext,
    novo: NovoContato,
    attachments: Vec<ImageFile>,
) -> CoreResult<SubmittedQuote> {
    novo.validate()?;

    let mut arquivos = novo.arquivos.clone();
    let mut skipped = Vec::new();
    for file in attachments {
        let name = file.name.clone();
        match upload_attachment(ctx, file).await {
            Ok(url) => arquivos.push(url),
            Err(err) => {
                warn!(name = %name, "attachment not uploaded: {err}");
                skipped.push(UploadFailure {
                    name,
                    reason: err.to_string(),
                });
            }
        }
    }

    let contato: Contato = ctx
        .client()
        .from(CONTATOS)
        .insert(NovoContato {
            arquivos,
            ..novo
        })
        .select("*")
        .single()
        .await?;
    debug!(id = %contato.id, attachments = contato.arquivos.len(), "quote received");

    Ok(SubmittedQuote {
        contato,
        skipped,
    })
}

pub async fn list_quotes(ctx: &AppContext) -> CoreResult<Vec<Contato>> {
    Ok(ctx
        .client()
        .from(CONTATOS)
        .select("*")
        .order("created_at", Direction::Desc)
        .execute()
        .await?)
}

pub async fn get_quote(ctx: &AppContext, id: &str) -> CoreResult<Contato> {
    ctx.client()
        .from(CONTATOS)
        .select("*")
        .eq("id", id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "orçamento", id))
}

pub async fn delete_quote(ctx: &AppContext, id: &str) -> CoreResult<()> {
    ctx.client().from(CONTATOS).delete().eq("id", id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use vitrine_config::config::Config;
    use vitrine_rest::memory::MemoryBackend;

    use super::*;

    fn context(backend: &Arc<MemoryBackend>) -> AppContext {
        AppContext::with_client(Config::default(), backend.client())
    }

    fn pedido() -> NovoContato {
        NovoContato {
            nome: "Ana".into(),
            email: "ana@exemplo.com".into(),
            mensagem: "Gostaria de um orçamento para 6 cadeiras".into(),
            arquivos: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_quote_with_attachment() {
        let backend = Arc::new(MemoryBackend::new());
        backend.create_bucket("produtos");
        let ctx = context(&backend);

        let submitted = submit_quote(
            &ctx,
            pedido(),
            vec![ImageFile::new("planta.pdf", "application/pdf", b"%PDF".to_vec())],
        )
        .await
        .unwrap();
        assert!(submitted.skipped.is_empty());
        assert_eq!(submitted.contato.arquivos.len(), 1);
        assert!(submitted.contato.arquivos[0].ends_with("-planta.pdf"));

        let stored = &backend.rows(CONTATOS)[0];
        assert!(stored["arquivos"].as_str().unwrap().starts_with("[\""));
    }

    #[tokio::test]
    async fn test_submit_quote_without_bucket_skips_attachments() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let submitted = submit_quote(
            &ctx,
            pedido(),
            vec![ImageFile::new("foto.png", "image/png", vec![0])],
        )
        .await
        .unwrap();
        assert_eq!(submitted.skipped.len(), 1);
        assert!(submitted.contato.arquivos.is_empty());
        assert_eq!(backend.rows(CONTATOS)[0]["arquivos"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_submit_quote_validates_email() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let err = submit_quote(
            &ctx,
            NovoContato {
                email: "sem-arroba".into(),
                ..pedido()
            },
            Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_list_get_delete_quotes() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            CONTATOS,
            vec![
                json!({"id": 1, "nome": "Ana", "email": "ana@exemplo.com", "mensagem": "a", "arquivos": null, "created_at": "2024-05-01T10:00:00Z"}),
                json!({"id": 2, "nome": "Bia", "email": "bia@exemplo.com", "mensagem": "b", "arquivos": "[\"https://cdn/x.pdf\"]", "created_at": "2024-05-02T10:00:00Z"}),
            ],
        );
        let ctx = context(&backend);

        let quotes = list_quotes(&ctx).await.unwrap();
        assert_eq!(quotes[0].nome, "Bia");
        assert_eq!(quotes[0].arquivos, ["https://cdn/x.pdf"]);

        assert_eq!(get_quote(&ctx, "1").await.unwrap().nome, "Ana");
        delete_quote(&ctx, "1").await.unwrap();
        assert!(matches!(
            get_quote(&ctx, "1").await,
            Err(CoreError::NotFound { entity: "orçamento", .. })
        ));
    }
}
