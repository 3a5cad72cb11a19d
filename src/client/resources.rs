use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use super::{ApiClient, ClientError};
use crate::model::{
    Achievements, Buddies, Challenges, Goals, Listable, Profiles, Resource, UserScoped, Workouts,
};

/// Calls for one record kind. Which listings exist follows the kind's traits.
#[derive(Debug, Clone, Copy)]
pub struct ResourceApi<'a, R> {
    client: &'a ApiClient,
    _kind: PhantomData<R>,
}

impl ApiClient {
    fn resource<R: Resource>(&self) -> ResourceApi<'_, R> {
        ResourceApi {
            client: self,
            _kind: PhantomData,
        }
    }

    pub fn profiles(&self) -> ResourceApi<'_, Profiles> {
        self.resource()
    }

    pub fn workouts(&self) -> ResourceApi<'_, Workouts> {
        self.resource()
    }

    pub fn buddies(&self) -> ResourceApi<'_, Buddies> {
        self.resource()
    }

    pub fn goals(&self) -> ResourceApi<'_, Goals> {
        self.resource()
    }

    pub fn achievements(&self) -> ResourceApi<'_, Achievements> {
        self.resource()
    }

    pub fn challenges(&self) -> ResourceApi<'_, Challenges> {
        self.resource()
    }
}

impl<R: Resource> ResourceApi<'_, R> {
    fn path(suffix: &str) -> String {
        format!("/{}{}", R::KIND.path(), suffix)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Value, ClientError> {
        self.client.get(&Self::path(&format!("/{id}"))).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.client.post(&Self::path(""), data).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, data: &B) -> Result<Value, ClientError> {
        self.client.put(&Self::path(&format!("/{id}")), data).await
    }

    /// Remove a record. The response carries a message and the removed record.
    pub async fn delete(&self, id: &str) -> Result<Value, ClientError> {
        self.client.delete(&Self::path(&format!("/{id}"))).await
    }
}

impl<R: Listable> ResourceApi<'_, R> {
    pub async fn get_all(&self) -> Result<Vec<Value>, ClientError> {
        self.client.get(&Self::path("")).await
    }
}

impl<R: UserScoped> ResourceApi<'_, R> {
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Value>, ClientError> {
        self.client.get(&Self::path(&format!("/user/{user_id}"))).await
    }
}

impl ResourceApi<'_, Profiles> {
    pub async fn get_by_email(&self, email: &str) -> Result<Value, ClientError> {
        self.client.get(&Self::path(&format!("/email/{email}"))).await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Value, ClientError> {
        self.client
            .get(&Self::path(&format!("/username/{username}")))
            .await
    }
}

impl ResourceApi<'_, Buddies> {
    /// Pending requests sent or received by `user_id`
    pub async fn pending(&self, user_id: &str) -> Result<Vec<Value>, ClientError> {
        self.client.get(&Self::path(&format!("/pending/{user_id}"))).await
    }
}
