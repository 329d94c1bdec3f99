pub mod auth_service;
pub use auth_service::{AuthError, AuthService, RegisteredUser};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod recommendation;
pub use recommendation::{Recommendation, RecommendationService};

pub mod token;
pub use token::{Claims, TokenSigner};
