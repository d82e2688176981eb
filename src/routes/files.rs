use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::PaginationQuery;
use crate::models::users::entities::UserRole;
use crate::services::FileService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_upload(&request, payload).await
}

pub async fn get_file(request: HttpRequest, file_id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.get_file(&request, file_id.0).await
}

pub async fn handle_download(
    request: HttpRequest,
    file_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_download(&request, file_id.0).await
}

pub async fn delete_file(request: HttpRequest, file_id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.delete_file(&request, file_id.0).await
}

pub async fn list_my_files(
    request: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .list_my_files(&request, query.into_inner())
        .await
}

pub async fn file_stats(request: HttpRequest) -> ActixResult<HttpResponse> {
    FILE_SERVICE.file_stats(&request).await
}

// 配置路由
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/files")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/upload")
                    .wrap(RateLimit::file_upload())
                    .route(web::post().to(handle_upload)),
            )
            .route("/mine", web::get().to(list_my_files))
            .service(
                web::resource("/stats")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route(web::get().to(file_stats)),
            )
            .route("/{id}", web::get().to(get_file))
            .route("/{id}", web::delete().to(delete_file))
            .route("/{id}/download", web::get().to(handle_download)),
    );
}
