//! The admin address book (`contatos_simples`).

use tracing::debug;
use vitrine_rest::Direction;

use crate::{
    error::{CoreError, CoreResult},
    models::{ContatoSimples, ContatoSimplesUpdate, NovoContatoSimples, CONTATOS_SIMPLES},
    timestamp,
    validate::Validate,
    AppContext,
};

pub async fn list_contacts(ctx: &AppContext) -> CoreResult<Vec<ContatoSimples>> {
    Ok(ctx
        .client()
        .from(CONTATOS_SIMPLES)
        .select("*")
        .order("nome", Direction::Asc)
        .execute()
        .await?)
}

pub async fn get_contact(ctx: &AppContext, id: &str) -> CoreResult<ContatoSimples> {
    ctx.client()
        .from(CONTATOS_SIMPLES)
        .select("*")
        .eq("id", id)
        .single()
        .await
        .map_err(|err| CoreError::from_single(err, "contato", id))
}

/// Stores a contact; the phone number is saved masked.
pub async fn create_contact(
    ctx: &AppContext,
    contato: NovoContatoSimples,
) -> CoreResult<ContatoSimples> {
    contato.validate()?;
    let contato = contato.normalized();

    let row: ContatoSimples = ctx
        .client()
        .from(CONTATOS_SIMPLES)
        .insert(contato)
        .select("*")
        .single()
        .await?;
    debug!(id = %row.id, "contact created");
    Ok(row)
}

pub async fn update_contact(
    ctx: &AppContext,
    id: &str,
    changes: ContatoSimplesUpdate,
) -> CoreResult<()> {
    let changes = ContatoSimplesUpdate {
        updated_at: Some(timestamp()),
        ..changes.normalized()
    };
    changes.validate()?;
    ctx.client()
        .from(CONTATOS_SIMPLES)
        .update(changes)
        .eq("id", id)
        .await?;
    Ok(())
}

pub async fn delete_contact(ctx: &AppContext, id: &str) -> CoreResult<()> {
    ctx.client()
        .from(CONTATOS_SIMPLES)
        .delete()
        .eq("id", id)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use vitrine_config::config::Config;
    use vitrine_rest::memory::MemoryBackend;
    use vitrine_utils::error::ValidationError;

    use super::*;

    fn context(backend: &Arc<MemoryBackend>) -> AppContext {
        AppContext::with_client(Config::default(), backend.client())
    }

    #[tokio::test]
    async fn test_create_contact_masks_phone() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let contato = create_contact(
            &ctx,
            NovoContatoSimples {
                nome: "Ana".into(),
                email: "ana@exemplo.com".into(),
                numero: Some("11 98765 4321".into()),
                observacao: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(contato.numero.as_deref(), Some("(11) 98765-4321"));
        assert_eq!(backend.rows(CONTATOS_SIMPLES)[0]["observacao"], Value::Null);
    }

    #[tokio::test]
    async fn test_create_contact_rejects_bad_phone() {
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend);

        let err = create_contact(
            &ctx,
            NovoContatoSimples {
                nome: "Ana".into(),
                email: "ana@exemplo.com".into(),
                numero: Some("9876".into()),
                observacao: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidPhone { .. })
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_list_update_delete_contacts() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            CONTATOS_SIMPLES,
            vec![
                json!({"id": 1, "nome": "Bia", "email": "bia@exemplo.com"}),
                json!({"id": 2, "nome": "Ana", "email": "ana@exemplo.com"}),
            ],
        );
        let ctx = context(&backend);

        let nomes: Vec<_> = list_contacts(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.nome)
            .collect();
        assert_eq!(nomes, ["Ana", "Bia"]);

        update_contact(
            &ctx,
            "1",
            ContatoSimplesUpdate {
                observacao: Some(Some("Cliente antigo".into())),
                ..ContatoSimplesUpdate::default()
            },
        )
        .await
        .unwrap();
        let contato = get_contact(&ctx, "1").await.unwrap();
        assert_eq!(contato.observacao.as_deref(), Some("Cliente antigo"));
        assert!(contato.updated_at.is_some());

        delete_contact(&ctx, "1").await.unwrap();
        assert!(matches!(
            get_contact(&ctx, "1").await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
