//! Task handlers - ownership-scoped CRUD plus the archive action.
//!
//! Every lookup goes through the repository's combined (id, owner) predicate,
//! so a task owned by another user yields the same 404 as a task that never
//! existed.

use actix_web::{HttpResponse, web};

use taskwell_core::domain::{NewTask, TaskChanges, TaskStatus};
use taskwell_core::ports::TaskFilter;
use taskwell_shared::ApiResponse;
use taskwell_shared::dto::{
    CreateTaskRequest, TaskListQuery, TaskListResponse, TaskResponse, UpdateTaskRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 20;

fn task_not_found() -> AppError {
    AppError::NotFound("task not found".to_string())
}

/// POST /v1/tasks
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreateTaskRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("task name is required".to_string()));
    }

    let task = state
        .tasks
        .create(NewTask {
            owner_id: identity.user_id,
            name: req.name,
            description: req.description,
        })
        .await?;

    tracing::debug!(task_id = task.id, owner_id = task.owner_id, "task created");

    Ok(HttpResponse::Created().json(ApiResponse::ok("task created", TaskResponse::from(task))))
}

/// GET /v1/tasks
pub async fn list(
    identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<TaskListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let page = state
        .tasks
        .list_owned(
            identity.user_id,
            TaskFilter {
                status: query.status,
                limit: Some(query.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
                offset: query.offset.unwrap_or(0),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "tasks retrieved",
        TaskListResponse {
            tasks: page.tasks.into_iter().map(TaskResponse::from).collect(),
            total: page.total,
        },
    )))
}

/// GET /v1/tasks/{id}
pub async fn get(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let task = state
        .tasks
        .find_owned(path.into_inner(), identity.user_id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("task retrieved", TaskResponse::from(task))))
}

/// PUT /v1/tasks/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdateTaskRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("task name cannot be empty".to_string()));
    }

    // Status is caller-settable to any enum value; archive is the only
    // endpoint that forces a particular transition.
    let task = state
        .tasks
        .update_owned(
            path.into_inner(),
            identity.user_id,
            TaskChanges {
                name: req.name,
                description: req.description,
                status: req.status,
            },
        )
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("task updated", TaskResponse::from(task))))
}

/// PATCH /v1/tasks/{id}/archive
pub async fn archive(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let task = state
        .tasks
        .update_owned(
            path.into_inner(),
            identity.user_id,
            TaskChanges {
                status: Some(TaskStatus::Canceled),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("task archived", TaskResponse::from(task))))
}

/// DELETE /v1/tasks/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let removed = state
        .tasks
        .delete_owned(path.into_inner(), identity.user_id)
        .await?;

    if !removed {
        return Err(task_not_found());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::empty("task deleted")))
}
