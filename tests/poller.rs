mod common;

use std::time::Duration;

use homework_notifier::{
    HomeworkPoller, PracticumApi, TelegramNotifier, TickOutcome,
    client::{ClientError, PollCursor},
};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use common::{
    RecordingNotifier, ScriptedSource, TELEGRAM_TOKEN, closed_port_uri, polling, test_config,
};

const START: i64 = 500;

fn poller(source: ScriptedSource) -> HomeworkPoller<ScriptedSource, RecordingNotifier> {
    HomeworkPoller::new(source, RecordingNotifier::default(), polling())
        .with_cursor(PollCursor::new(START))
}

fn server_error() -> ClientError {
    ClientError::unexpected_status("https://practicum.test/", StatusCode::INTERNAL_SERVER_ERROR)
}

#[tokio::test]
async fn empty_homeworks_advance_cursor_silently() {
    let mut poller = poller(ScriptedSource::new([Ok(json!({
        "homeworks": [],
        "current_date": 1000
    }))]));

    assert_eq!(poller.run_once().await, TickOutcome::Idle);
    assert_eq!(poller.cursor(), PollCursor::new(1000));
    assert!(poller.notifier().sent().is_empty());
}

#[tokio::test]
async fn status_change_is_notified_once() {
    let mut poller = poller(ScriptedSource::new([Ok(json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 2000
    }))]));

    assert_eq!(poller.run_once().await, TickOutcome::Notified);

    let sent = poller.notifier().sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].ends_with("\"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"));
    assert_eq!(poller.cursor(), PollCursor::new(2000));
}

#[tokio::test]
async fn only_the_most_recent_homework_is_reported() {
    let mut poller = poller(ScriptedSource::new([Ok(json!({
        "homeworks": [
            {"homework_name": "hw2", "status": "reviewing"},
            {"homework_name": "hw1", "status": "rejected"}
        ],
        "current_date": 2100
    }))]));

    poller.run_once().await;

    assert_eq!(
        poller.notifier().sent(),
        vec!["Изменился статус проверки работы \"hw2\". Работа взята на проверку ревьюером."]
    );
}

#[tokio::test]
async fn server_error_is_reported_and_cursor_kept() {
    let mut poller = poller(ScriptedSource::new([Err(server_error())]));

    assert_eq!(poller.run_once().await, TickOutcome::Failed { reported: true });
    assert_eq!(poller.cursor(), PollCursor::new(START));

    let sent = poller.notifier().sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("Сбой в работе программы: "));
    assert!(sent[0].contains("500"));
}

#[tokio::test]
async fn missing_homeworks_key_is_reported_and_cursor_kept() {
    let mut poller = poller(ScriptedSource::new([Ok(json!({"current_date": 3000}))]));

    assert_eq!(poller.run_once().await, TickOutcome::Failed { reported: true });
    assert_eq!(poller.cursor(), PollCursor::new(START));
    assert_eq!(
        poller.notifier().sent(),
        vec!["Сбой в работе программы: В ответе API отсутствует ключ homeworks"]
    );
}

#[tokio::test]
async fn malformed_shape_does_not_advance_cursor() {
    let mut poller = poller(ScriptedSource::new([Ok(json!({
        "homeworks": "hw1",
        "current_date": 3000
    }))]));

    assert_eq!(poller.run_once().await, TickOutcome::Failed { reported: true });
    assert_eq!(poller.cursor(), PollCursor::new(START));
}

#[tokio::test]
async fn unknown_status_is_surfaced_through_notifier() {
    let mut poller = poller(ScriptedSource::new([Ok(json!({
        "homeworks": [{"homework_name": "hw1", "status": "graded"}],
        "current_date": 4000
    }))]));

    assert_eq!(poller.run_once().await, TickOutcome::Failed { reported: true });
    assert_eq!(
        poller.notifier().sent(),
        vec!["Сбой в работе программы: Неожиданный статус домашней работы: graded"]
    );
    // the response itself was well-formed, so the window still moves
    assert_eq!(poller.cursor(), PollCursor::new(4000));
}

#[tokio::test]
async fn same_homework_may_be_reported_twice() {
    let change = json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": START
    });
    let mut poller = poller(ScriptedSource::new([Ok(change.clone()), Ok(change)]));

    poller.run_once().await;
    poller.run_once().await;

    let sent = poller.notifier().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
    assert_eq!(poller.source().seen(), vec![PollCursor::new(START); 2]);
}

#[tokio::test]
async fn failed_tick_repolls_the_same_window() {
    let mut poller = poller(ScriptedSource::new([
        Err(server_error()),
        Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": 900
        })),
    ]));

    poller.run_once().await;
    assert_eq!(poller.run_once().await, TickOutcome::Notified);

    assert_eq!(
        poller.source().seen(),
        vec![PollCursor::new(START), PollCursor::new(START)]
    );
    assert_eq!(poller.cursor(), PollCursor::new(900));
}

#[tokio::test(start_paused = true)]
async fn run_sleeps_between_iterations_until_shutdown() {
    let mut poller = poller(ScriptedSource::new([
        Err(server_error()),
        Ok(json!({"homeworks": [], "current_date": 1100})),
        Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1700
        })),
    ]));
    let shutdown = poller.shutdown_sender();

    let stop = async {
        // ticks run at 0s, 600s and 1200s; stop during the third sleep
        tokio::time::sleep(Duration::from_secs(1500)).await;
        shutdown.send(()).unwrap();
    };
    tokio::join!(poller.run(), stop);

    assert_eq!(
        poller.source().seen(),
        vec![PollCursor::new(START), PollCursor::new(START), PollCursor::new(1100)]
    );
    assert_eq!(poller.notifier().sent().len(), 2);
    assert_eq!(poller.cursor(), PollCursor::new(1700));
}

#[tokio::test]
async fn connection_failure_is_logged_only() {
    let config = test_config(&closed_port_uri(), "http://telegram.invalid");
    let mut poller = HomeworkPoller::new(
        PracticumApi::new(&config).unwrap(),
        RecordingNotifier::default(),
        polling(),
    )
    .with_cursor(PollCursor::new(START));

    assert_eq!(poller.run_once().await, TickOutcome::Failed { reported: false });
    assert!(poller.notifier().sent().is_empty());
    assert_eq!(poller.cursor(), PollCursor::new(START));
}

#[tokio::test]
async fn end_to_end_over_http() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("from_date", START.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 2000
        })))
        .expect(1)
        .mount(&api)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TELEGRAM_TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&telegram)
        .await;

    let config = test_config(&api.uri(), &telegram.uri());
    let mut poller = HomeworkPoller::new(
        PracticumApi::new(&config).unwrap(),
        TelegramNotifier::new(&config).unwrap(),
        config.polling.clone(),
    )
    .with_cursor(PollCursor::new(START));

    assert_eq!(poller.run_once().await, TickOutcome::Notified);
    assert_eq!(poller.cursor(), PollCursor::new(2000));

    let received = telegram.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(
        body["text"],
        "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
    );
}

#[tokio::test]
async fn telegram_outage_does_not_stop_polling() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "homeworks": [{"homework_name": "hw1", "status": "rejected"}],
            "current_date": 2500
        })))
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&telegram)
        .await;

    let config = test_config(&api.uri(), &telegram.uri());
    let mut poller = HomeworkPoller::new(
        PracticumApi::new(&config).unwrap(),
        TelegramNotifier::new(&config).unwrap(),
        config.polling.clone(),
    )
    .with_cursor(PollCursor::new(START));

    assert_eq!(poller.run_once().await, TickOutcome::Notified);
    assert_eq!(poller.cursor(), PollCursor::new(2500));
}
