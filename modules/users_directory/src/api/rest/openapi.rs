use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::{dto, handlers, problem};

#[derive(OpenApi)]
#[openapi(
    info(title = "User Directory API", description = "Users, blocks and search"),
    paths(
        handlers::create_user,
        handlers::list_users,
        handlers::search_users,
        handlers::get_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::block_user,
        handlers::unblock_user,
        handlers::health,
    ),
    components(schemas(
        dto::UserDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        dto::BlockReq,
        dto::BlockerDto,
        dto::BlockResultDto,
        dto::MessageDto,
        dto::HealthDto,
        problem::Problem,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "User accounts"),
        (name = "blocks", description = "Blocking between users"),
        (name = "system", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
