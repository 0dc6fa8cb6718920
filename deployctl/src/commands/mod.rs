pub mod app_name;
pub mod auth_token;
pub mod find_review_app;
pub mod normalize;
pub mod review_app;
pub mod run;
pub mod wait_build;
