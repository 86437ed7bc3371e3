// Catalog side: blocking client for the dog.ceo API. It lists breeds with
// their sub-breeds and picks a random image for a breed or sub-breed.
// The catalog never learns where images end up.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::error;

/// Breed name to its sub-breed names; an empty list means no sub-breeds.
pub type BreedCatalog = BTreeMap<String, Vec<String>>;

/// Queries the backup run makes against the image catalog.
pub trait ImageCatalog {
    /// Full breed listing. Empty when the catalog could not be read.
    fn list_all_breeds(&self) -> Result<BreedCatalog>;

    /// One image URL for `breed` (narrowed to `sub_breed` when given).
    fn resolve_image(&self, breed: &str, sub_breed: Option<&str>) -> Result<Option<String>>;
}

impl<T: ImageCatalog + ?Sized> ImageCatalog for &T {
    fn list_all_breeds(&self) -> Result<BreedCatalog> {
        (**self).list_all_breeds()
    }

    fn resolve_image(&self, breed: &str, sub_breed: Option<&str>) -> Result<Option<String>> {
        (**self).resolve_image(breed, sub_breed)
    }
}

/// Status-tagged envelope every dog.ceo endpoint returns.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    status: Option<String>,
    message: Option<T>,
}

impl<T> Envelope<T> {
    fn into_success(self) -> Option<T> {
        match self.status.as_deref() {
            Some("success") => self.message,
            _ => None,
        }
    }
}

/// Parse a breed listing body. A missing `message` or a non-success
/// status yields `None`; a body that is not JSON at all is an error.
pub fn parse_breed_listing(body: &str) -> Result<Option<BreedCatalog>> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).context("Breed listing is not valid JSON")?;
    let message = match envelope.status.as_deref() {
        None | Some("success") => envelope.message,
        Some(_) => None,
    };
    match message {
        Some(value) => {
            let breeds = serde_json::from_value(value).context("Breed listing has an unexpected shape")?;
            Ok(Some(breeds))
        }
        None => Ok(None),
    }
}

/// Parse a random image body; anything other than a success envelope
/// carrying a string is `None`.
pub fn parse_image_url(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<String>>(body)
        .ok()
        .and_then(Envelope::into_success)
        .filter(|url| !url.trim().is_empty())
}

#[derive(Clone)]
pub struct DogCeoClient {
    client: Client,
    base_url: String,
}

impl DogCeoClient {
    /// Build a client against `base_url`, e.g. `https://dog.ceo/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().build().context("Failed to build HTTP client")?;
        Ok(DogCeoClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn image_endpoint(&self, breed: &str, sub_breed: Option<&str>) -> String {
        match sub_breed {
            Some(sub) => format!("{}/breed/{}/{}/images/random", &self.base_url, breed, sub),
            None => format!("{}/breed/{}/images/random", &self.base_url, breed),
        }
    }
}

impl ImageCatalog for DogCeoClient {
    fn list_all_breeds(&self) -> Result<BreedCatalog> {
        let url = format!("{}/breeds/list/all", &self.base_url);
        let res = self.client.get(&url).send().context("Failed to send breed listing request")?;
        if !res.status().is_success() {
            error!("Failed to list breeds: {}", res.status());
            return Ok(BreedCatalog::new());
        }

        let body = res.text().context("Failed to read breed listing")?;
        match parse_breed_listing(&body)? {
            Some(breeds) => Ok(breeds),
            None => {
                error!("Breed listing carried no breeds");
                Ok(BreedCatalog::new())
            }
        }
    }

    fn resolve_image(&self, breed: &str, sub_breed: Option<&str>) -> Result<Option<String>> {
        let url = self.image_endpoint(breed, sub_breed);
        let res = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to send image request for {}", breed))?;

        let image = if res.status().is_success() {
            let body = res.text().with_context(|| format!("Failed to read image response for {}", breed))?;
            parse_image_url(&body)
        } else {
            None
        };

        if image.is_none() {
            match sub_breed {
                Some(sub) => error!("Failed to get an image for {}/{}", breed, sub),
                None => error!("Failed to get an image for {}", breed),
            }
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_keeps_breeds_with_and_without_sub_breeds() {
        let body = r#"{"message":{"akita":[],"bulldog":["boston","english","french"]},"status":"success"}"#;
        let breeds = parse_breed_listing(body).unwrap().unwrap();
        assert_eq!(breeds["akita"], Vec::<String>::new());
        assert_eq!(breeds["bulldog"], vec!["boston", "english", "french"]);
    }

    #[test]
    fn listing_without_message_is_unavailable() {
        assert_eq!(parse_breed_listing(r#"{"status":"success"}"#).unwrap(), None);
        assert_eq!(parse_breed_listing(r#"{"status":"error","message":"Not found"}"#).unwrap(), None);
    }

    #[test]
    fn listing_that_is_not_json_is_an_error() {
        assert!(parse_breed_listing("<html>").is_err());
    }

    #[test]
    fn image_requires_success_status() {
        let ok = r#"{"message":"https://images.dog.ceo/breeds/husky/n02110185_1469.jpg","status":"success"}"#;
        assert_eq!(
            parse_image_url(ok).as_deref(),
            Some("https://images.dog.ceo/breeds/husky/n02110185_1469.jpg")
        );
        assert_eq!(parse_image_url(r#"{"message":"Breed not found","status":"error"}"#), None);
        assert_eq!(parse_image_url(r#"{"message":"https://x/y.jpg"}"#), None);
        assert_eq!(parse_image_url(r#"{"message":["a"],"status":"success"}"#), None);
        assert_eq!(parse_image_url("not json"), None);
    }

    #[test]
    fn image_endpoint_includes_sub_breed() {
        let client = DogCeoClient::new("https://dog.ceo/api/").unwrap();
        assert_eq!(
            client.image_endpoint("husky", None),
            "https://dog.ceo/api/breed/husky/images/random"
        );
        assert_eq!(
            client.image_endpoint("bulldog", Some("french")),
            "https://dog.ceo/api/breed/bulldog/french/images/random"
        );
    }
}
