pub mod signed_url_service;
