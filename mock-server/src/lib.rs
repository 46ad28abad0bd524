use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

const USERS: u64 = 10;
const POSTS_PER_USER: u64 = 10;
const COMMENTS_PER_POST: u64 = 5;
const TODOS_PER_USER: u64 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: u64,
    pub id: u64,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Payload for `POST /posts` and `PUT /posts/{id}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

/// Payload for `PATCH /posts/{id}`. Omitted fields stay unchanged.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub user_id: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    pub user_id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFilter {
    pub post_id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFilter {
    pub user_id: Option<u64>,
    pub completed: Option<bool>,
}

/// In-memory resources, seeded on startup.
#[derive(Debug)]
pub struct Store {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub users: Vec<User>,
    pub todos: Vec<Todo>,
    next_post_id: u64,
}

impl Store {
    pub fn seeded() -> Self {
        let users: Vec<User> = (1..=USERS)
            .map(|id| User {
                id,
                name: format!("User {id}"),
                username: format!("user{id}"),
                email: format!("user{id}@example.com"),
            })
            .collect();

        let posts: Vec<Post> = (1..=USERS * POSTS_PER_USER)
            .map(|id| Post {
                user_id: (id - 1) / POSTS_PER_USER + 1,
                id,
                title: format!("post title {id}"),
                body: format!("post body {id}"),
            })
            .collect();

        let comments = (1..=posts.len() as u64 * COMMENTS_PER_POST)
            .map(|id| Comment {
                post_id: (id - 1) / COMMENTS_PER_POST + 1,
                id,
                name: format!("comment {id}"),
                email: format!("commenter{id}@example.com"),
                body: format!("comment body {id}"),
            })
            .collect();

        let todos = (1..=USERS * TODOS_PER_USER)
            .map(|id| Todo {
                user_id: (id - 1) / TODOS_PER_USER + 1,
                id,
                title: format!("todo {id}"),
                completed: id % 3 == 0,
            })
            .collect();

        let next_post_id = posts.len() as u64 + 1;
        Self {
            posts,
            comments,
            users,
            todos,
            next_post_id,
        }
    }

    fn post_index(&self, id: u64) -> Option<usize> {
        self.posts.iter().position(|p| p.id == id)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .route("/posts/{id}/comments", get(post_comments))
        .route("/comments", get(list_comments))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/todos", get(list_todos))
        .route("/todos/{id}", get(get_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_posts(State(db): State<Db>, Query(filter): Query<PostFilter>) -> Json<Vec<Post>> {
    let store = db.read().await;
    let posts = store
        .posts
        .iter()
        .filter(|p| filter.user_id.map_or(true, |user_id| p.user_id == user_id))
        .cloned()
        .collect();
    Json(posts)
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut store = db.write().await;
    let post = Post {
        user_id: input.user_id,
        id: store.next_post_id,
        title: input.title,
        body: input.body,
    };
    store.next_post_id += 1;
    store.posts.push(post.clone());
    debug!(id = post.id, "post created");
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Post>, StatusCode> {
    let store = db.read().await;
    store
        .posts
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn replace_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewPost>,
) -> Result<Json<Post>, StatusCode> {
    let mut store = db.write().await;
    let index = store.post_index(id).ok_or(StatusCode::NOT_FOUND)?;
    let post = Post {
        user_id: input.user_id,
        id,
        title: input.title,
        body: input.body,
    };
    store.posts[index] = post.clone();
    Ok(Json(post))
}

async fn patch_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<PostPatch>,
) -> Result<Json<Post>, StatusCode> {
    let mut store = db.write().await;
    let index = store.post_index(id).ok_or(StatusCode::NOT_FOUND)?;
    let post = &mut store.posts[index];
    if let Some(user_id) = input.user_id {
        post.user_id = user_id;
    }
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let index = store.post_index(id).ok_or(StatusCode::NOT_FOUND)?;
    store.posts.remove(index);
    store.comments.retain(|c| c.post_id != id);
    debug!(id, "post deleted");
    Ok(Json(json!({})))
}

async fn post_comments(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Comment>>, StatusCode> {
    let store = db.read().await;
    store.post_index(id).ok_or(StatusCode::NOT_FOUND)?;
    let comments = store
        .comments
        .iter()
        .filter(|c| c.post_id == id)
        .cloned()
        .collect();
    Ok(Json(comments))
}

async fn list_comments(
    State(db): State<Db>,
    Query(filter): Query<CommentFilter>,
) -> Json<Vec<Comment>> {
    let store = db.read().await;
    let comments = store
        .comments
        .iter()
        .filter(|c| filter.post_id.map_or(true, |post_id| c.post_id == post_id))
        .cloned()
        .collect();
    Json(comments)
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    Json(db.read().await.users.clone())
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, StatusCode> {
    let store = db.read().await;
    store
        .users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_todos(State(db): State<Db>, Query(filter): Query<TodoFilter>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    let todos = store
        .todos
        .iter()
        .filter(|t| filter.user_id.map_or(true, |user_id| t.user_id == user_id))
        .filter(|t| filter.completed.map_or(true, |completed| t.completed == completed))
        .cloned()
        .collect();
    Json(todos)
}

async fn get_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Todo>, StatusCode> {
    let store = db.read().await;
    store
        .todos
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_with_camel_case_keys() {
        let post = Post {
            user_id: 1,
            id: 1,
            title: "Test".to_string(),
            body: "Body".to_string(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Test");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn seed_has_expected_shape() {
        let store = Store::seeded();
        assert_eq!(store.users.len(), 10);
        assert_eq!(store.posts.len(), 100);
        assert_eq!(store.comments.len(), 500);
        assert_eq!(store.todos.len(), 200);
        assert_eq!(store.next_post_id, 101);
        assert_eq!(store.posts[10].user_id, 2);
        assert_eq!(store.comments.iter().filter(|c| c.post_id == 1).count(), 5);
    }

    #[test]
    fn first_todo_matches_reference_data() {
        let store = Store::seeded();
        let todo = &store.todos[0];
        assert_eq!((todo.user_id, todo.id, todo.completed), (1, 1, false));
        assert!(store.todos[2].completed);
    }

    #[test]
    fn new_post_requires_all_fields() {
        let result: Result<NewPost, _> = serde_json::from_str(r#"{"title":"t","body":"b"}"#);
        assert!(result.is_err());
        let input: NewPost =
            serde_json::from_str(r#"{"title":"t","body":"b","userId":1}"#).unwrap();
        assert_eq!(input.user_id, 1);
    }

    #[test]
    fn post_patch_all_fields_optional() {
        let input: PostPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.user_id.is_none());
        assert!(input.title.is_none());
        assert!(input.body.is_none());
    }

    #[test]
    fn post_patch_partial_fields() {
        let input: PostPatch = serde_json::from_str(r#"{"title":"New title"}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("New title"));
        assert!(input.body.is_none());
    }
}
