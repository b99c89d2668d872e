//! The two fixed datasets a scan runs against: the branch directory and the
//! products of interest. Both are plain JSON objects keyed by id.

use crate::domain::model::{BranchCode, BranchInfo, ProductId, ProductInfo};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StockError};
use crate::utils::validation::validate_non_empty_string;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct StaticData {
    pub branches: BTreeMap<BranchCode, BranchInfo>,
    pub products: BTreeMap<ProductId, ProductInfo>,
}

impl StaticData {
    pub async fn load<S: Storage>(
        storage: &S,
        branches_file: &str,
        products_file: &str,
    ) -> Result<Self> {
        let branches = Self::read_json_object(storage, branches_file).await?;
        let products = Self::read_json_object(storage, products_file).await?;
        Self::from_parts(branches, products)
    }

    pub fn from_parts(
        branches: BTreeMap<BranchCode, BranchInfo>,
        products: BTreeMap<ProductId, ProductInfo>,
    ) -> Result<Self> {
        if products.is_empty() {
            return Err(StockError::ConfigError {
                message: "product list is empty, nothing to look for".to_string(),
            });
        }
        for id in products.keys() {
            validate_non_empty_string("products", id)?;
        }
        for code in branches.keys() {
            validate_non_empty_string("branches", code)?;
        }

        tracing::debug!(
            "Loaded {} branches and {} products",
            branches.len(),
            products.len()
        );

        Ok(Self { branches, products })
    }

    async fn read_json_object<S, T>(storage: &S, path: &str) -> Result<BTreeMap<String, T>>
    where
        S: Storage,
        T: serde::de::DeserializeOwned,
    {
        let bytes = storage.read_file(path).await?;
        serde_json::from_slice(&bytes).map_err(|e| StockError::ConfigValidationError {
            field: path.to_string(),
            message: format!("expected a JSON object keyed by id: {}", e),
        })
    }

    /// Branch codes in file order (lexicographic, as stored).
    pub fn branch_codes(&self) -> Vec<BranchCode> {
        self.branches.keys().cloned().collect()
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.keys().cloned().collect()
    }

    pub fn branch(&self, code: &str) -> Option<&BranchInfo> {
        self.branches.get(code)
    }

    pub fn product_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.products
            .get(id)
            .and_then(ProductInfo::display_name)
            .unwrap_or(id)
    }

    /// Drops requested branch codes that are not in the directory.
    pub fn known_branches(&self, requested: &[BranchCode]) -> Vec<BranchCode> {
        requested
            .iter()
            .filter(|code| {
                let known = self.branches.contains_key(code.as_str());
                if !known {
                    tracing::warn!("Skipping unknown branch {}", code);
                }
                known
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use tempfile::TempDir;

    async fn write(dir: &TempDir, name: &str, content: &str) {
        tokio::fs::write(dir.path().join(name), content).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_static_data() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "branches.json",
            r#"{"101": {"branchName": "Dizengoff", "branchCity": "Tel Aviv"},
                "205": {"branchName": "Hadar", "branchCity": "Haifa"}}"#,
        )
        .await;
        write(
            &dir,
            "products.json",
            r#"{"p-18": "Concerta 18mg", "p-36": {"name": "Concerta 36mg"}}"#,
        )
        .await;

        let storage = LocalStorage::new(dir.path().to_str().unwrap());
        let data = StaticData::load(&storage, "branches.json", "products.json")
            .await
            .unwrap();

        assert_eq!(data.branch_codes(), vec!["101".to_string(), "205".to_string()]);
        assert_eq!(data.branch("205").unwrap().branch_city, "Haifa");
        assert_eq!(data.product_name("p-36"), "Concerta 36mg");
        assert_eq!(data.product_name("p-unknown"), "p-unknown");
    }

    #[tokio::test]
    async fn test_malformed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(&dir, "branches.json", "[1, 2, 3]").await;
        write(&dir, "products.json", r#"{"p": "x"}"#).await;

        let storage = LocalStorage::new(dir.path().to_str().unwrap());
        let err = StaticData::load(&storage, "branches.json", "products.json")
            .await
            .unwrap_err();

        assert!(matches!(err, StockError::ConfigValidationError { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap());

        let err = StaticData::load(&storage, "nope.json", "products.json")
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::IoError(_)));
    }

    #[test]
    fn test_empty_product_list_rejected() {
        let err = StaticData::from_parts(BTreeMap::new(), BTreeMap::new()).unwrap_err();
        assert!(matches!(err, StockError::ConfigError { .. }));
    }

    #[test]
    fn test_known_branches_filters_unknown_codes() {
        let mut branches = BTreeMap::new();
        branches.insert("1".to_string(), BranchInfo::default());
        let mut products = BTreeMap::new();
        products.insert("p".to_string(), ProductInfo::default());
        let data = StaticData::from_parts(branches, products).unwrap();

        let known = data.known_branches(&["1".to_string(), "2".to_string()]);
        assert_eq!(known, vec!["1".to_string()]);
    }
}
