use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{director, genre, movie},
    error::AppResult,
    models::{MovieBody, NameBody},
};

/// Persistence adapter for the three catalog collections. All write
/// operations commit a single transaction scoped to the call.
#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

/// Equality predicates for the movie listing. Present fields are AND-combined.
#[derive(Clone, Copy, Debug, Default)]
pub struct MovieFilter {
    pub genre_id: Option<i32>,
    pub director_id: Option<i32>,
}

/// Outcome of deleting a genre or director.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Removal {
    Removed,
    Missing,
    /// Still referenced by this many movies; nothing was deleted.
    Referenced(u64),
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_movies(&self, filter: MovieFilter) -> AppResult<Vec<movie::Model>> {
        let mut query = movie::Entity::find();
        if let Some(genre_id) = filter.genre_id {
            query = query.filter(movie::Column::GenreId.eq(genre_id));
        }
        if let Some(director_id) = filter.director_id {
            query = query.filter(movie::Column::DirectorId.eq(director_id));
        }
        Ok(query.order_by_asc(movie::Column::Id).all(&self.db).await?)
    }

    pub async fn find_movie(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create_movie(&self, fields: MovieBody) -> AppResult<movie::Model> {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(fields.title),
            description: Set(fields.description),
            trailer: Set(fields.trailer),
            year: Set(fields.year),
            rating: Set(fields.rating),
            genre_id: Set(fields.genre_id),
            director_id: Set(fields.director_id),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn delete_movie(&self, id: i32) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Display names for the given genre ids, one batched query.
    pub async fn genre_names(&self, ids: &[i32]) -> AppResult<HashMap<i32, Option<String>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = genre::Entity::find()
            .filter(genre::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|g| (g.id, g.name)).collect())
    }

    pub async fn director_names(&self, ids: &[i32]) -> AppResult<HashMap<i32, Option<String>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = director::Entity::find()
            .filter(director::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|d| (d.id, d.name)).collect())
    }

    pub async fn list_genres(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().order_by_asc(genre::Column::Id).all(&self.db).await?)
    }

    pub async fn find_genre(&self, id: i32) -> AppResult<Option<genre::Model>> {
        Ok(genre::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create_genre(&self, fields: NameBody) -> AppResult<genre::Model> {
        let model = genre::ActiveModel { id: Default::default(), name: Set(fields.name) };
        Ok(model.insert(&self.db).await?)
    }

    /// Overwrites the name of an existing genre. Returns false when the id is
    /// unknown; nothing is written in that case.
    pub async fn rename_genre(&self, id: i32, name: String) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        let Some(found) = genre::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(false);
        };
        let mut active: genre::ActiveModel = found.into();
        active.name = Set(Some(name));
        active.update(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    /// Deletes a genre unless movies still reference it. The existence check,
    /// reference count, and delete share one transaction.
    pub async fn delete_genre(&self, id: i32) -> AppResult<Removal> {
        let txn = self.db.begin().await?;
        if genre::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(Removal::Missing);
        }
        let refs = movie::Entity::find()
            .filter(movie::Column::GenreId.eq(id))
            .count(&txn)
            .await?;
        if refs > 0 {
            return Ok(Removal::Referenced(refs));
        }
        genre::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(Removal::Removed)
    }

    pub async fn list_directors(&self) -> AppResult<Vec<director::Model>> {
        Ok(director::Entity::find().order_by_asc(director::Column::Id).all(&self.db).await?)
    }

    pub async fn find_director(&self, id: i32) -> AppResult<Option<director::Model>> {
        Ok(director::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create_director(&self, fields: NameBody) -> AppResult<director::Model> {
        let model = director::ActiveModel { id: Default::default(), name: Set(fields.name) };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn rename_director(&self, id: i32, name: String) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        let Some(found) = director::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(false);
        };
        let mut active: director::ActiveModel = found.into();
        active.name = Set(Some(name));
        active.update(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    pub async fn delete_director(&self, id: i32) -> AppResult<Removal> {
        let txn = self.db.begin().await?;
        if director::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(Removal::Missing);
        }
        let refs = movie::Entity::find()
            .filter(movie::Column::DirectorId.eq(id))
            .count(&txn)
            .await?;
        if refs > 0 {
            return Ok(Removal::Referenced(refs));
        }
        director::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(Removal::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn store() -> CatalogStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        CatalogStore::new(db)
    }

    fn movie_body(genre_id: Option<i32>, director_id: Option<i32>) -> MovieBody {
        MovieBody {
            title: Some("a film".into()),
            description: None,
            trailer: None,
            year: None,
            rating: None,
            genre_id,
            director_id,
        }
    }

    #[tokio::test]
    async fn movie_filters_are_and_combined() {
        let store = store().await;
        let g1 = store.create_genre(NameBody { name: Some("Drama".into()) }).await.unwrap();
        let g2 = store.create_genre(NameBody { name: Some("Comedy".into()) }).await.unwrap();
        let d1 = store.create_director(NameBody { name: Some("Lynch".into()) }).await.unwrap();

        store.create_movie(movie_body(Some(g1.id), Some(d1.id))).await.unwrap();
        store.create_movie(movie_body(Some(g1.id), None)).await.unwrap();
        store.create_movie(movie_body(Some(g2.id), Some(d1.id))).await.unwrap();

        let by_genre = store
            .list_movies(MovieFilter { genre_id: Some(g1.id), director_id: None })
            .await
            .unwrap();
        assert_eq!(by_genre.len(), 2);

        let both = store
            .list_movies(MovieFilter { genre_id: Some(g1.id), director_id: Some(d1.id) })
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].genre_id, Some(g1.id));
        assert_eq!(both[0].director_id, Some(d1.id));

        let all = store.list_movies(MovieFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn referenced_genre_is_not_deleted() {
        let store = store().await;
        let genre = store.create_genre(NameBody { name: Some("Drama".into()) }).await.unwrap();
        let movie = store.create_movie(movie_body(Some(genre.id), None)).await.unwrap();

        assert_eq!(store.delete_genre(genre.id).await.unwrap(), Removal::Referenced(1));
        assert!(store.find_genre(genre.id).await.unwrap().is_some());

        assert!(store.delete_movie(movie.id).await.unwrap());
        assert_eq!(store.delete_genre(genre.id).await.unwrap(), Removal::Removed);
        assert_eq!(store.delete_genre(genre.id).await.unwrap(), Removal::Missing);
    }

    #[tokio::test]
    async fn rename_missing_director_touches_nothing() {
        let store = store().await;
        assert!(!store.rename_director(42, "Kubrick".into()).await.unwrap());
        assert!(store.list_directors().await.unwrap().is_empty());
    }
}
