pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart_service::CartService;
use application::order_service::OrderService;
use infrastructure::cart_repo::DieselCartRepository;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub type AppCartService = CartService<DieselCartRepository>;
pub type AppOrderService = OrderService<DieselOrderRepository>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::carts::create_cart,
        handlers::carts::get_cart,
        handlers::carts::add_cart_item,
        handlers::carts::remove_cart_item,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::add_order_line,
        handlers::orders::list_order_lines,
        handlers::orders::get_order_line,
    ),
    components(schemas(
        handlers::carts::CreateCartRequest,
        handlers::carts::CartResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::OrderResponse,
        handlers::orders::CreateOrderLineRequest,
        handlers::orders::OrderLineResponse,
        handlers::orders::ListOrdersResponse,
    ))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let cart_service = web::Data::new(CartService::new(DieselCartRepository::new(pool.clone())));
    let order_service = web::Data::new(OrderService::new(DieselOrderRepository::new(pool)));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(cart_service.clone())
            .app_data(order_service.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/carts")
                    .route("", web::post().to(handlers::carts::create_cart))
                    .route("/{user_id}", web::get().to(handlers::carts::get_cart))
                    .route(
                        "/{user_id}/items/{product_id}",
                        web::post().to(handlers::carts::add_cart_item),
                    )
                    .route(
                        "/{user_id}/items/{product_id}",
                        web::delete().to(handlers::carts::remove_cart_item),
                    ),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    // Registered before /{order_id} so "lines" is not
                    // swallowed by the id segment.
                    .route(
                        "/lines/{line_id}",
                        web::get().to(handlers::orders::get_order_line),
                    )
                    .route("/{order_id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{order_id}/lines",
                        web::post().to(handlers::orders::add_order_line),
                    )
                    .route(
                        "/{order_id}/lines",
                        web::get().to(handlers::orders::list_order_lines),
                    ),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
