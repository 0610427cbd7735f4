use async_trait::async_trait;
use clinicamr_core::{AmrFeatureDocument, ParagraphCache};
use clinicamr_entities::paragraph_amrs;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryOrder, Schema, Set,
};
use tracing::{debug, info};

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Paragraph cache in a SQLite (or any `sea-orm` supported) database.
pub struct DatabaseParagraphCache {
    db: DatabaseConnection,
}

impl DatabaseParagraphCache {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to paragraph cache: {}", db_url);

        let db = Database::connect(db_url).await?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(paragraph_amrs::Entity);
        match db.execute_unprepared(&backend.build(&stmt).to_string()).await {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                debug!("Table already exists, skipping creation");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self { db })
    }
}

#[async_trait]
impl ParagraphCache for DatabaseParagraphCache {
    async fn load(&self, key: &str) -> anyhow::Result<Option<AmrFeatureDocument>> {
        let Some(model) = paragraph_amrs::Entity::find_by_id(key.to_owned())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&model.document)?))
    }

    async fn dump(&self, key: &str, doc: &AmrFeatureDocument) -> anyhow::Result<()> {
        let document = serde_json::to_string(doc)?;
        let now = chrono::Utc::now().naive_utc();

        if self.exists(key).await? {
            paragraph_amrs::Entity::update(paragraph_amrs::ActiveModel {
                key: Set(key.to_owned()),
                document: Set(document),
                created_at: Set(now),
            })
            .exec(&self.db)
            .await?;
        } else {
            paragraph_amrs::ActiveModel {
                key: Set(key.to_owned()),
                document: Set(document),
                created_at: Set(now),
            }
            .insert(&self.db)
            .await?;
        }

        debug!("Stored paragraph: {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        Ok(paragraph_amrs::Entity::find_by_id(key.to_owned())
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        let models = paragraph_amrs::Entity::find()
            .order_by_asc(paragraph_amrs::Column::Key)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.key).collect())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let res = paragraph_amrs::Entity::delete_many().exec(&self.db).await?;
        info!("Deleted {} cached paragraphs", res.rows_affected);
        Ok(())
    }
}
