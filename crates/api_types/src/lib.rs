use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod category {
    use super::*;

    /// New parent for a category: a category id, or the string `"none"` to
    /// detach it to the top level.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum ParentField {
        Id(i64),
        Sentinel(String),
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub currency: String,
        pub parent: Option<i64>,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub currency: Option<String>,
        pub parent: Option<ParentField>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub name: String,
        pub currency: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub parent: Option<i64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub children: Vec<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub first_name: String,
        pub last_name: String,
        /// Only present when a user reads their own profile.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub preferred_currency: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub emails: Option<Vec<String>>,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub preferred_currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSearchResponse {
        pub users: Vec<UserView>,
    }
}

pub mod email {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailCreate {
        pub email_address: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailUpdate {
        pub email_address: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailListResponse {
        pub emails: Vec<String>,
    }
}

pub mod contact {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactCreate {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactListResponse {
        pub contacts: Vec<super::user::UserView>,
    }
}

pub mod currency {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyCreate {
        pub code: String,
        pub name: String,
        pub rate: Decimal,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CurrencyUpdate {
        pub name: Option<String>,
        pub rate: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyView {
        pub id: i64,
        pub code: String,
        pub name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub owner: Option<String>,
        pub rate: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyListResponse {
        pub currencies: Vec<CurrencyView>,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreate {
        pub name: String,
        pub currency: String,
        pub start_balance: Decimal,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub start_balance: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i64,
        pub name: String,
        pub currency: String,
        pub start_balance: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountSplit {
        pub account_id: i64,
        pub amount: Decimal,
        #[serde(default)]
        pub verified: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySplit {
        pub category_id: i64,
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreate {
        pub description: String,
        pub original_description: Option<String>,
        pub amount: Decimal,
        pub currency: String,
        pub date: NaiveDate,
        #[serde(default)]
        pub accounts: Vec<AccountSplit>,
        #[serde(default)]
        pub categories: Vec<CategorySplit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub original_description: Option<String>,
        pub amount: Decimal,
        pub currency: String,
        pub date: NaiveDate,
        pub accounts: Vec<AccountSplit>,
        pub categories: Vec<CategorySplit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}
