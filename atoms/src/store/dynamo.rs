use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use serde_json::{Number, Value};
use std::collections::HashMap;

use super::{Document, DocumentStore, SetMode, StoreError, StoreResult};

const DOC_PREFIX: &str = "DOC#";

/// Single-table DynamoDB document store.
///
/// Layout: `PK = COLLECTION#<path>`, `SK = DOC#<id>`, document fields stored
/// as attributes next to the keys.
#[derive(Debug, Clone)]
pub struct DynamoDocumentStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDocumentStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn pk(collection: &str) -> String {
    format!("COLLECTION#{}", collection)
}

fn sk(id: &str) -> String {
    format!("{}{}", DOC_PREFIX, id)
}

/// Map a JSON value onto the matching DynamoDB attribute.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Map a DynamoDB attribute back to JSON. Set and binary types are not
/// written by this store and read back as `null`.
pub fn attribute_to_json(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Number(i.into())
            } else {
                n.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.clone()))
            }
        }
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::L(items) => Value::Array(items.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn item_to_document(item: &HashMap<String, AttributeValue>) -> Document {
    item.iter()
        .filter(|(k, _)| k.as_str() != "PK" && k.as_str() != "SK")
        .map(|(k, v)| (k.clone(), attribute_to_json(v)))
        .collect()
}

fn document_to_item(collection: &str, id: &str, doc: &Document) -> HashMap<String, AttributeValue> {
    let mut item: HashMap<String, AttributeValue> = doc
        .iter()
        .map(|(k, v)| (k.clone(), json_to_attribute(v)))
        .collect();
    item.insert("PK".to_string(), AttributeValue::S(pk(collection)));
    item.insert("SK".to_string(), AttributeValue::S(sk(id)));
    item
}

/// Build `SET #f0 = :v0, #f1 = :v1` with its placeholder maps.
fn set_expression(
    doc: &Document,
) -> (String, HashMap<String, String>, HashMap<String, AttributeValue>) {
    let mut update_expr = vec![];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    for (i, (field, value)) in doc.iter().enumerate() {
        let name = format!("#f{}", i);
        let placeholder = format!(":v{}", i);
        update_expr.push(format!("{} = {}", name, placeholder));
        expr_names.insert(name, field.clone());
        expr_values.insert(placeholder, json_to_attribute(value));
    }

    (format!("SET {}", update_expr.join(", ")), expr_names, expr_values)
}

fn classify<E, R>(op: &str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StoreError::Unavailable(format!("DynamoDB {} error: {}", op, DisplayErrorContext(&err)))
        }
        other => {
            tracing::error!("DynamoDB {} error: {}", op, DisplayErrorContext(&other));
            StoreError::backend(other)
        }
    }
}

impl DynamoDocumentStore {
    async fn merge(&self, collection: &str, id: &str, doc: &Document, must_exist: bool) -> StoreResult<()> {
        if doc.is_empty() {
            return Ok(());
        }
        let (update_expression, expr_names, expr_values) = set_expression(doc);

        let mut builder = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk(collection)))
            .key("SK", AttributeValue::S(sk(id)))
            .update_expression(update_expression)
            .set_expression_attribute_names(Some(expr_names))
            .set_expression_attribute_values(Some(expr_values));

        if must_exist {
            builder = builder.condition_expression("attribute_exists(PK)");
        }

        match builder.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Err(StoreError::not_found(collection, id))
            }
            Err(err) => Err(classify("update_item", err)),
        }
    }
}

#[async_trait]
impl DocumentStore for DynamoDocumentStore {
    async fn add(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.set(collection, &id, doc, SetMode::Overwrite).await?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
        mode: SetMode,
    ) -> StoreResult<()> {
        if mode == SetMode::Merge {
            return self.merge(collection, id, &doc, false).await;
        }

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(document_to_item(collection, id, &doc)))
            .send()
            .await
            .map_err(|e| classify("put_item", e))?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()> {
        self.merge(collection, id, &doc, true).await
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk(collection)))
            .key("SK", AttributeValue::S(sk(id)))
            .send()
            .await
            .map_err(|e| classify("get_item", e))?;

        Ok(result.item().map(item_to_document))
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        let mut documents = Vec::new();
        let mut start_key = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(pk(collection)))
                .expression_attribute_values(":sk_prefix", AttributeValue::S(DOC_PREFIX.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| classify("query", e))?;

            for item in result.items() {
                if let Some(id) = item
                    .get("SK")
                    .and_then(|v| v.as_s().ok())
                    .and_then(|sk| sk.strip_prefix(DOC_PREFIX))
                {
                    documents.push((id.to_string(), item_to_document(item)));
                }
            }

            match result.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk(collection)))
            .key("SK", AttributeValue::S(sk(id)))
            .send()
            .await
            .map_err(|e| classify("delete_item", e))?;
        Ok(())
    }
}
