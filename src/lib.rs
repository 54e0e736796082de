pub mod data {
    pub mod datasources {
        pub mod billing_sdk_datasource;
        pub mod identity_datasource;
        pub mod ledger_datasource;
        pub(crate) mod utils;
        #[cfg(test)]
        pub(crate) mod mocks;
    }
    pub mod models {
        pub mod billing_sdk {
            pub mod customer_info_model;
            pub mod offerings_model;
        }
        pub mod ledger {
            pub mod subscription_row_model;
        }
    }
    pub mod repositories {
        pub(crate) mod capability_gate;
        pub(crate) mod catalog_resolver;
        pub mod entitlement_repository_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod entitlement;
        pub mod platform;
        pub mod product;
        pub mod purchase;
        pub mod verification;
    }
    pub mod repositories {
        pub mod entitlement_repository;
    }
}

pub mod config;
pub mod errors;
pub mod events;
pub mod service;
