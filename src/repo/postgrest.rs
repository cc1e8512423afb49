use super::postgrest_queries as queries;
use crate::{
    consts, models,
    services::{
        BackendError,
        backend::{self, BackendClient, SINGLE_OBJECT_ACCEPT},
    },
};
use async_trait::async_trait;
use reqwest::{Method, header};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgrestRepo {
    pub backend: BackendClient,
}

#[derive(Deserialize)]
struct PhotoRow {
    #[serde(default)]
    photo_url: Option<String>,
}

impl PostgrestRepo {
    fn table_request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.backend.request(method, &self.backend.rest_url(table))
    }
}

#[async_trait]
impl super::PetRepo for PostgrestRepo {
    async fn get_owner_pets(&self, owner_id: Uuid) -> anyhow::Result<Vec<models::pet::Pet>> {
        let response = self
            .table_request(Method::GET, consts::PETS_TABLE)
            .query(&queries::owner_pets(owner_id))
            .send()
            .await
            .map_err(BackendError::from)?;

        Ok(backend::handle_response(response).await?)
    }

    async fn get_pet_by_id(
        &self,
        pet_id: i64,
        owner_id: Uuid,
    ) -> anyhow::Result<models::pet::Pet> {
        let response = self
            .table_request(Method::GET, consts::PETS_TABLE)
            .query(&queries::owner_pet_by_id(pet_id, owner_id))
            .header(header::ACCEPT, SINGLE_OBJECT_ACCEPT)
            .send()
            .await
            .map_err(BackendError::from)?;

        Ok(backend::handle_response(response).await?)
    }

    async fn insert_pet(&self, pet: &models::pet::NewPet) -> anyhow::Result<()> {
        let response = self
            .table_request(Method::POST, consts::PETS_TABLE)
            .header("Prefer", "return=minimal")
            .json(pet)
            .send()
            .await
            .map_err(BackendError::from)?;

        Ok(backend::expect_success(response).await?)
    }

    async fn set_pet_lost_status(&self, pet_id: i64, is_lost: bool) -> anyhow::Result<()> {
        let response = self
            .table_request(Method::PATCH, consts::PETS_TABLE)
            .query(&[("id", queries::eq(pet_id))])
            .header("Prefer", "return=minimal")
            .json(&json!({"is_lost": is_lost}))
            .send()
            .await
            .map_err(BackendError::from)?;

        Ok(backend::expect_success(response).await?)
    }

    async fn update_pet_profile(
        &self,
        pet_id: i64,
        profile: &models::pet::PetProfileUpdate,
    ) -> anyhow::Result<models::pet::Pet> {
        let response = self
            .table_request(Method::PATCH, consts::PETS_TABLE)
            .query(&queries::pet_by_id(pet_id, consts::PET_DETAIL_COLUMNS))
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, SINGLE_OBJECT_ACCEPT)
            .json(profile)
            .send()
            .await
            .map_err(BackendError::from)?;

        Ok(backend::handle_response(response).await?)
    }

    async fn set_pet_photo_path(
        &self,
        pet_id: i64,
        path: &str,
    ) -> anyhow::Result<Option<String>> {
        let response = self
            .table_request(Method::PATCH, consts::PETS_TABLE)
            .query(&queries::pet_by_id(pet_id, "id,photo_url"))
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, SINGLE_OBJECT_ACCEPT)
            .json(&json!({"photo_url": path}))
            .send()
            .await
            .map_err(BackendError::from)?;

        let row: PhotoRow = backend::handle_response(response).await?;
        Ok(row.photo_url)
    }

    async fn link_unlinked_tag(
        &self,
        code: &str,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::tag::Tag>> {
        let response = self
            .table_request(Method::PATCH, consts::TAGS_TABLE)
            .query(&queries::unlinked_tag_by_code(code))
            .header("Prefer", "return=representation")
            .json(&json!({"pet_id": pet_id, "status": models::tag::TagStatus::Linked}))
            .send()
            .await
            .map_err(BackendError::from)?;

        Ok(backend::handle_response(response).await?)
    }

    async fn get_public_pet_by_tag(
        &self,
        code: &str,
    ) -> anyhow::Result<Vec<models::tag::PublicPet>> {
        let response = self
            .backend
            .request(
                Method::POST,
                &self
                    .backend
                    .rest_url(&format!("rpc/{}", consts::PUBLIC_LOOKUP_RPC)),
            )
            .json(&json!({"p_code": code}))
            .send()
            .await
            .map_err(BackendError::from)?;

        // a function returning a single row comes back as an object
        let rows: serde_json::Value = backend::handle_response(response).await?;
        Ok(match rows {
            serde_json::Value::Null => vec![],
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<_, _>>()?,
            row => vec![serde_json::from_value(row)?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repo::PetRepo, services::test_backend::TestBackend};

    fn repo(backend: &TestBackend) -> PostgrestRepo {
        let client = backend.client();
        client.set_access_token(Some("jwt".into()));
        PostgrestRepo { backend: client }
    }

    #[tokio::test]
    async fn test_link_tag_only_when_unlinked() {
        let backend = TestBackend::start().await;
        backend.reply_json(
            200,
            json!([{"id": 9, "code": "CHIP-001", "pet_id": 4, "status": "linked"}]),
        );

        let tags = repo(&backend)
            .link_unlinked_tag("CHIP-001", 4)
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].status, models::tag::TagStatus::Linked);

        let request = backend.only_request();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "/rest/v1/tags");
        assert_eq!(request.query_value("code"), Some("eq.CHIP-001"));
        assert_eq!(request.query_value("pet_id"), Some("is.null"));
        assert_eq!(request.query_value("select"), Some(consts::TAG_COLUMNS));
        assert_eq!(request.header("prefer"), Some("return=representation"));
        assert_eq!(request.header("apikey"), Some("anon"));
        assert_eq!(request.header("authorization"), Some("Bearer jwt"));
        assert_eq!(request.json(), json!({"pet_id": 4, "status": "linked"}));
    }

    #[tokio::test]
    async fn test_link_tag_without_matching_row() {
        let backend = TestBackend::start().await;
        backend.reply_json(200, json!([]));

        let tags = repo(&backend).link_unlinked_tag("USED", 4).await.unwrap();

        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_insert_pet_body_and_prefer() {
        let backend = TestBackend::start().await;
        backend.reply_raw(201, "");

        let pet = models::pet::NewPet {
            owner_id: Uuid::nil(),
            name: "Luna".into(),
            species: "Gato".into(),
            breed: None,
            color: Some("Negro".into()),
            birth_year: Some(2020),
            birth_date: None,
            photo_url: None,
        };
        repo(&backend).insert_pet(&pet).await.unwrap();

        let request = backend.only_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/rest/v1/pets");
        assert_eq!(request.header("prefer"), Some("return=minimal"));
        assert_eq!(
            request.json(),
            json!({
                "owner_id": "00000000-0000-0000-0000-000000000000",
                "name": "Luna",
                "species": "Gato",
                "color": "Negro",
                "birth_year": 2020
            })
        );
    }

    #[tokio::test]
    async fn test_insert_pet_error_keeps_backend_message() {
        let backend = TestBackend::start().await;
        backend.reply_json(
            409,
            json!({"code": "23505", "message": "duplicate key value", "details": null}),
        );

        let err = repo(&backend)
            .insert_pet(&models::pet::NewPet {
                owner_id: Uuid::nil(),
                name: "Luna".into(),
                species: "Gato".into(),
                breed: None,
                color: None,
                birth_year: None,
                birth_date: None,
                photo_url: None,
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<BackendError>(),
            Some(&BackendError::Api {
                status: 409,
                message: "duplicate key value".into()
            })
        );
    }

    #[tokio::test]
    async fn test_update_profile_returns_single_row() {
        let backend = TestBackend::start().await;
        backend.reply_json(
            200,
            json!({"id": 4, "name": "Toby", "species": "Perro", "weight_kg": 11.5}),
        );

        let update = models::pet::PetProfileUpdate {
            weight_kg: Some(11.5),
            ..Default::default()
        };
        let pet = repo(&backend).update_pet_profile(4, &update).await.unwrap();

        assert_eq!(pet.weight_kg, Some(11.5));

        let request = backend.only_request();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.query_value("id"), Some("eq.4"));
        assert_eq!(request.query_value("select"), Some(consts::PET_DETAIL_COLUMNS));
        assert_eq!(request.header("prefer"), Some("return=representation"));
        assert_eq!(request.header("accept"), Some(SINGLE_OBJECT_ACCEPT));
        // cleared columns are sent as null
        assert_eq!(request.json()["color"], serde_json::Value::Null);
        assert_eq!(request.json()["weight_kg"], json!(11.5));
    }

    #[tokio::test]
    async fn test_lost_status_patch() {
        let backend = TestBackend::start().await;
        backend.reply_raw(204, "");

        repo(&backend).set_pet_lost_status(4, true).await.unwrap();

        let request = backend.only_request();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.query_value("id"), Some("eq.4"));
        assert_eq!(request.json(), json!({"is_lost": true}));
    }

    #[tokio::test]
    async fn test_public_lookup_single_object_and_list() {
        let backend = TestBackend::start().await;
        backend.reply_json(200, json!({"name": "Toby", "contact_phone": "+56912345678"}));
        backend.reply_json(200, json!([]));

        let repo = repo(&backend);
        let found = repo.get_public_pet_by_tag("CHIP-001").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Toby");

        assert!(repo.get_public_pet_by_tag("NOPE").await.unwrap().is_empty());

        let requests = backend.requests();
        assert_eq!(
            requests[0].path,
            format!("/rest/v1/rpc/{}", consts::PUBLIC_LOOKUP_RPC)
        );
        assert_eq!(requests[0].json(), json!({"p_code": "CHIP-001"}));
    }
}
