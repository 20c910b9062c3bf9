//! Row types and write payloads for each table.
//!
//! Row types deserialize whatever the backend sends back; ids arrive as UUID
//! strings or as integers depending on the schema and are kept as strings.
//! Payload types (`Novo*`, `*Update`, `*Input`) implement [`Validate`] and
//! are checked before any request is built.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use vitrine_utils::{
    error::ValidationResult,
    string::slugify,
    validate::{mask_phone, require_email, require_non_empty, require_phone},
};

use crate::validate::{require_non_negative, require_non_negative_f64, Validate};

pub const PRODUTOS: &str = "produtos";
pub const CATEGORIAS: &str = "categorias";
pub const PRODUTO_IMAGENS: &str = "produto_imagens";
pub const CONTATOS: &str = "contatos";
pub const CONTATOS_SIMPLES: &str = "contatos_simples";
pub const USUARIOS: &str = "usuarios";
pub const CONFIGURACOES: &str = "configuracoes";

fn id_text<E: de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(E::custom(format!("expected string or number id, got {other}"))),
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    id_text(Value::deserialize(deserializer)?)?.ok_or_else(|| de::Error::custom("missing id"))
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    id_text(Value::deserialize(deserializer)?)
}

/// `arquivos` is stored as a JSON-encoded array of URLs, or null.
fn de_arquivos<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => serde_json::from_str(&s).map_err(de::Error::custom),
        value @ Value::Array(_) => serde_json::from_value(value).map_err(de::Error::custom),
        other => Err(de::Error::custom(format!("unexpected arquivos value: {other}"))),
    }
}

fn ser_arquivos<S: Serializer>(urls: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    if urls.is_empty() {
        return serializer.serialize_none();
    }
    let encoded = serde_json::to_string(urls).map_err(serde::ser::Error::custom)?;
    serializer.serialize_some(&encoded)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Produto {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub preco: f64,
    #[serde(default)]
    pub estoque: i64,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub categoria_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NovoProduto {
    pub nome: String,
    pub descricao: Option<String>,
    pub preco: f64,
    pub estoque: i64,
    pub categoria_id: Option<String>,
}

impl Validate for NovoProduto {
    fn validate(&self) -> ValidationResult<()> {
        require_non_empty("nome", &self.nome)?;
        require_non_negative_f64("preco", self.preco)?;
        require_non_negative("estoque", self.estoque)
    }
}

/// Partial product changes. `Some(None)` clears a nullable column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProdutoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preco: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estoque: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<Option<String>>,
}

impl ProdutoUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Validate for ProdutoUpdate {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(nome) = &self.nome {
            require_non_empty("nome", nome)?;
        }
        if let Some(preco) = self.preco {
            require_non_negative_f64("preco", preco)?;
        }
        if let Some(estoque) = self.estoque {
            require_non_negative("estoque", estoque)?;
        }
        Ok(())
    }
}

/// A product with its category and its images in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProdutoDetalhado {
    #[serde(flatten)]
    pub produto: Produto,
    pub categoria: Option<Categoria>,
    pub imagens: Vec<ProdutoImagem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categoria {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NovaCategoria {
    pub nome: String,
    pub slug: String,
    pub descricao: Option<String>,
}

impl NovaCategoria {
    /// A category whose slug is derived from `nome`.
    pub fn new(nome: impl Into<String>) -> Self {
        let nome = nome.into();
        Self {
            slug: slugify(&nome),
            nome,
            descricao: None,
        }
    }

    /// Fills in the slug from `nome` when it was left blank, and normalizes a
    /// given one.
    pub fn normalized(mut self) -> Self {
        let source = if self.slug.trim().is_empty() {
            &self.nome
        } else {
            &self.slug
        };
        self.slug = slugify(source);
        self.descricao = non_blank(self.descricao);
        self
    }
}

impl Validate for NovaCategoria {
    fn validate(&self) -> ValidationResult<()> {
        require_non_empty("nome", &self.nome)?;
        require_non_empty("slug", &self.slug)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategoriaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<Option<String>>,
}

impl CategoriaUpdate {
    pub fn normalized(mut self) -> Self {
        self.slug = self.slug.map(|slug| slugify(&slug));
        self.descricao = self.descricao.map(non_blank);
        self
    }
}

impl Validate for CategoriaUpdate {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(nome) = &self.nome {
            require_non_empty("nome", nome)?;
        }
        if let Some(slug) = &self.slug {
            require_non_empty("slug", slug)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProdutoImagem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub produto_id: String,
    pub url: String,
    #[serde(default)]
    pub ordem: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Embedded `produto:produtos(id, nome)` when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produto: Option<ProdutoResumo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProdutoResumo {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NovaImagem {
    pub produto_id: String,
    pub url: String,
    pub ordem: i64,
}

impl Validate for NovaImagem {
    fn validate(&self) -> ValidationResult<()> {
        require_non_empty("produto_id", &self.produto_id)?;
        require_non_empty("url", &self.url)?;
        require_non_negative("ordem", self.ordem)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImagemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordem: Option<i64>,
}

impl Validate for ImagemUpdate {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(url) = &self.url {
            require_non_empty("url", url)?;
        }
        if let Some(ordem) = self.ordem {
            require_non_negative("ordem", ordem)?;
        }
        Ok(())
    }
}

/// A quote request sent from the public site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contato {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    pub email: String,
    #[serde(default)]
    pub mensagem: String,
    #[serde(default, deserialize_with = "de_arquivos")]
    pub arquivos: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NovoContato {
    pub nome: String,
    pub email: String,
    pub mensagem: String,
    /// Public URLs of uploaded attachments.
    #[serde(serialize_with = "ser_arquivos")]
    pub arquivos: Vec<String>,
}

impl Validate for NovoContato {
    fn validate(&self) -> ValidationResult<()> {
        require_non_empty("nome", &self.nome)?;
        require_email(&self.email)?;
        require_non_empty("mensagem", &self.mensagem)
    }
}

/// An entry of the admin address book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContatoSimples {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    pub email: String,
    #[serde(default)]
    pub numero: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NovoContatoSimples {
    pub nome: String,
    pub email: String,
    pub numero: Option<String>,
    pub observacao: Option<String>,
}

impl NovoContatoSimples {
    /// Drops blank optional fields and masks the phone number.
    pub fn normalized(mut self) -> Self {
        self.numero = non_blank(self.numero).map(|n| mask_phone(&n));
        self.observacao = non_blank(self.observacao);
        self
    }
}

impl Validate for NovoContatoSimples {
    fn validate(&self) -> ValidationResult<()> {
        require_non_empty("nome", &self.nome)?;
        require_email(&self.email)?;
        match self.numero.as_deref() {
            Some(numero) if !numero.trim().is_empty() => require_phone(numero),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContatoSimplesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacao: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ContatoSimplesUpdate {
    pub fn normalized(mut self) -> Self {
        self.numero = self
            .numero
            .map(|n| non_blank(n).map(|n| mask_phone(&n)));
        self.observacao = self.observacao.map(non_blank);
        self
    }
}

impl Validate for ContatoSimplesUpdate {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(nome) = &self.nome {
            require_non_empty("nome", nome)?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        if let Some(Some(numero)) = &self.numero {
            require_phone(numero)?;
        }
        Ok(())
    }
}

/// A back-office account. Password material never leaves the auth module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The single row of site settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuracoes {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub nome_empresa: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub email_contato: Option<String>,
    #[serde(default)]
    pub horario_funcionamento: Option<String>,
    #[serde(default)]
    pub cor_primaria: Option<String>,
    #[serde(default)]
    pub cor_secundaria: Option<String>,
    #[serde(default)]
    pub cor_destaque: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfiguracoesInput {
    pub nome_empresa: String,
    pub logo_url: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub email_contato: Option<String>,
    pub horario_funcionamento: Option<String>,
    pub cor_primaria: Option<String>,
    pub cor_secundaria: Option<String>,
    pub cor_destaque: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ConfiguracoesInput {
    /// Blank optional fields are stored as null.
    pub fn normalized(self) -> Self {
        Self {
            nome_empresa: self.nome_empresa.trim().to_string(),
            logo_url: non_blank(self.logo_url),
            telefone: non_blank(self.telefone),
            endereco: non_blank(self.endereco),
            email_contato: non_blank(self.email_contato),
            horario_funcionamento: non_blank(self.horario_funcionamento),
            cor_primaria: non_blank(self.cor_primaria),
            cor_secundaria: non_blank(self.cor_secundaria),
            cor_destaque: non_blank(self.cor_destaque),
            updated_at: self.updated_at,
        }
    }
}

impl Validate for ConfiguracoesInput {
    fn validate(&self) -> ValidationResult<()> {
        require_non_empty("nome_empresa", &self.nome_empresa)?;
        match self.email_contato.as_deref() {
            Some(email) => require_email(email),
            None => Ok(()),
        }
    }
}
