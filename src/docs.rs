use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::influencers::list_influencers,
        crate::api::cart::get_cart,
        crate::api::cart::add_item,
        crate::api::checkout::checkout,
        crate::api::conversations::list_conversations
    ),
    components(
        schemas(
            crate::models::PartyType,
            crate::models::CartEntry,
            crate::models::Influencer,
            crate::api::auth::RegisterRequest,
            crate::api::auth::LoginRequest,
            crate::api::auth::AuthResponse,
            crate::api::cart::CartView,
            crate::api::cart::AddCartItemRequest,
            crate::api::cart::UpdateQuantityRequest,
            crate::api::conversations::SendMessageRequest,
            crate::api::influencers::UpdateProfileRequest,
            crate::checkout::CheckoutReport
        )
    ),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "influencers", description = "Talent directory"),
        (name = "cart", description = "Package cart"),
        (name = "checkout", description = "Cart to collaborations"),
        (name = "conversations", description = "Messaging inbox")
    )
)]
pub struct ApiDoc;
