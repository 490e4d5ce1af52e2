//! Request/response types shared by the HTTP server and its clients.
//!
//! Money crosses the wire as `amount_minor`: integer cents, never floats.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: Option<String>,
    }

    /// Query string for `/users/search`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSearch {
        pub q: String,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        #[serde(default)]
        pub member_user_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub member_user_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupRename {
        pub name: String,
    }
}

pub mod expense {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum SplitType {
        Equal,
    }

    /// Request body for creating an expense.
    ///
    /// Either `split_type = "EQUAL"` (owed amounts derived from the current
    /// member set) or an explicit `splits` map; `split_type` wins when both
    /// are present.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub paid_by_user_id: Uuid,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub split_type: Option<SplitType>,
        pub splits: Option<BTreeMap<Uuid, i64>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub paid_by_user_id: Uuid,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub archived: bool,
        pub splits: BTreeMap<Uuid, i64>,
    }
}

pub mod balance {
    use super::*;

    /// One recommended settling payment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from_user_id: Uuid,
        pub to_user_id: Uuid,
        pub amount_minor: i64,
    }

    /// Request body for `/groups/{id}/settle`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleNew {
        pub from_user_id: Uuid,
        pub to_user_id: Uuid,
        pub amount_minor: i64,
    }
}
