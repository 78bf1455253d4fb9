use chrono::Duration;
use futures::{SinkExt, StreamExt};
use live_attendance::{
    attendance_session::coordinator::AttendanceSession,
    auth::token::issue_token,
    models::{role::Role, status::Status},
    persistence::memory_bridge::MemoryBridge,
    realtime::{connection, gateway::Gateway},
};
use serde_json::{Value, json};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const SECRET: &str = "realtime-test-secret";
const TEACHER_ID: i32 = 10;
const STUDENT_ID: i32 = 100;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Server {
    addr: SocketAddr,
    session: Arc<AttendanceSession>,
    bridge: Arc<MemoryBridge>,
}

async fn spawn_server() -> Server {
    let session = Arc::new(AttendanceSession::new());
    let bridge = Arc::new(MemoryBridge::new());
    bridge
        .add_class(1, TEACHER_ID, "Mathematics", vec![STUDENT_ID, 200])
        .unwrap();

    let gateway = Arc::new(Gateway::new(
        session.clone(),
        bridge.clone(),
        SECRET.to_string(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, connection::router(gateway))
            .await
            .unwrap();
    });

    Server {
        addr,
        session,
        bridge,
    }
}

async fn connect(addr: SocketAddr, query: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws{query}")).await.unwrap();
    socket
}

async fn connect_as(addr: SocketAddr, user_id: i32, role: Role) -> Socket {
    let token = issue_token(user_id, role, SECRET, Duration::hours(1)).unwrap();
    connect(addr, &format!("?token={token}")).await
}

async fn send(socket: &mut Socket, frame: Value) {
    socket
        .send(Message::text(frame.to_string()))
        .await
        .unwrap();
}

/// Next text frame as JSON, skipping control frames.
async fn receive(socket: &mut Socket) -> Value {
    let wait = async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("Expected a text frame, got {other:?}"),
            }
        }
    };

    tokio::time::timeout(std::time::Duration::from_secs(5), wait)
        .await
        .expect("Timed out waiting for a realtime message")
}

async fn assert_closed(socket: &mut Socket) {
    let next = tokio::time::timeout(std::time::Duration::from_secs(5), socket.next())
        .await
        .expect("Timed out waiting for close");

    assert!(
        !matches!(next, Some(Ok(Message::Text(_)))),
        "Expected the connection to close, got {next:?}"
    );
}

#[tokio::test]
async fn connection_without_token_gets_one_error_then_closes() {
    let server = spawn_server().await;
    let mut socket = connect(server.addr, "").await;

    assert_eq!(
        receive(&mut socket).await,
        json!({"event": "ERROR", "data": {"message": "Unauthorized, token missing or invalid"}})
    );
    assert_closed(&mut socket).await;
}

#[tokio::test]
async fn connection_with_forged_token_is_rejected() {
    let server = spawn_server().await;
    let forged = issue_token(TEACHER_ID, Role::Teacher, "wrong-secret", Duration::hours(1)).unwrap();
    let mut socket = connect(server.addr, &format!("?token={forged}")).await;

    assert_eq!(receive(&mut socket).await["event"], "ERROR");
    assert_closed(&mut socket).await;
}

#[tokio::test]
async fn full_session_over_websocket() {
    let server = spawn_server().await;
    server.session.start(1).unwrap();

    let mut student = connect_as(server.addr, STUDENT_ID, Role::Student).await;
    send(&mut student, json!({"event": "MY_ATTENDANCE", "data": {}})).await;
    assert_eq!(
        receive(&mut student).await,
        json!({"event": "MY_ATTENDANCE", "data": {"status": "not yet updated"}})
    );

    let mut teacher = connect_as(server.addr, TEACHER_ID, Role::Teacher).await;
    send(&mut teacher, json!({"event": "TODAY_SUMMARY", "data": {}})).await;
    let empty_summary = json!({"event": "TODAY_SUMMARY", "data": {"present": 0, "absent": 0, "total": 0}});
    assert_eq!(receive(&mut teacher).await, empty_summary);
    assert_eq!(receive(&mut student).await, empty_summary);

    send(
        &mut teacher,
        json!({"event": "ATTENDANCE_MARKED", "data": {"studentId": STUDENT_ID, "status": "present"}}),
    )
    .await;
    let marked = json!({"event": "ATTENDANCE_MARKED", "data": {"studentId": STUDENT_ID, "status": "present"}});
    assert_eq!(receive(&mut teacher).await, marked);
    assert_eq!(receive(&mut student).await, marked);

    send(&mut student, json!({"event": "MY_ATTENDANCE", "data": {}})).await;
    assert_eq!(
        receive(&mut student).await,
        json!({"event": "MY_ATTENDANCE", "data": {"status": "present"}})
    );

    send(&mut teacher, json!({"event": "DONE", "data": {}})).await;
    let done = json!({
        "event": "DONE",
        "data": {"message": "Attendance persisted", "present": 1, "absent": 0, "total": 1}
    });
    assert_eq!(receive(&mut teacher).await, done);
    assert_eq!(receive(&mut student).await, done);

    let records = server.bridge.records(1).unwrap();
    assert_eq!(records[&STUDENT_ID], Status::Present);
    assert_eq!(records[&200], Status::Absent);
    assert!(server.session.session().unwrap().is_none());
}

#[tokio::test]
async fn bad_input_does_not_close_the_connection() {
    let server = spawn_server().await;
    let mut student = connect_as(server.addr, STUDENT_ID, Role::Student).await;

    student
        .send(Message::text("definitely not json"))
        .await
        .unwrap();
    assert_eq!(
        receive(&mut student).await,
        json!({"event": "ERROR", "data": {"message": "Invalid message format"}})
    );

    send(&mut student, json!({"event": "DONE", "data": {}})).await;
    assert_eq!(
        receive(&mut student).await,
        json!({"event": "ERROR", "data": {"message": "Forbidden, teacher event only"}})
    );

    send(&mut student, json!({"event": "MY_ATTENDANCE", "data": {}})).await;
    assert_eq!(
        receive(&mut student).await,
        json!({"event": "ERROR", "data": {"message": "No active attendance session"}})
    );
}
