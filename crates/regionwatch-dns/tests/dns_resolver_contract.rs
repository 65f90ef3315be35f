//! DnsRegionResolver contract tests against a local UDP nameserver

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::CNAME;
use hickory_proto::rr::{Name, RData, Record};
use regionwatch_core::RegionResolver;
use regionwatch_dns::DnsRegionResolver;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;

const RECORD_NAME: &str = "global.health.example.";

/// Nameserver answering CNAME queries from a script
///
/// Query `n` is answered with `script[n]`; once exhausted the last entry
/// repeats. Every answer carries a long TTL.
struct ScriptedNameserver {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
}

impl ScriptedNameserver {
    async fn start(script: Vec<Vec<&'static str>>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                let Ok(request) = Message::from_vec(&buf[..len]) else {
                    continue;
                };

                let n = counter.fetch_add(1, Ordering::SeqCst);
                let targets = &script[n.min(script.len() - 1)];
                let response = cname_response(&request, targets);
                let _ = socket.send_to(&response.to_vec().unwrap(), peer).await;
            }
        });

        Self { addr, queries }
    }

    fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

fn cname_response(request: &Message, targets: &[&str]) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);
    response.add_queries(request.queries().to_vec());

    let name = request.queries()[0].name().clone();
    for target in targets {
        let rdata = RData::CNAME(CNAME(Name::from_str(target).unwrap()));
        response.add_answer(Record::from_rdata(name.clone(), 300, rdata));
    }

    response
}

fn resolver_for(addr: SocketAddr, timeout: Duration) -> DnsRegionResolver {
    DnsRegionResolver::with_nameservers(RECORD_NAME, vec![addr], timeout).unwrap()
}

#[tokio::test]
async fn single_cname_resolves_to_region() {
    let nameserver = ScriptedNameserver::start(vec![vec!["health.us-east-1.example."]]).await;
    let resolver = resolver_for(nameserver.addr, Duration::from_secs(2));

    let region = resolver.resolve().await.unwrap();

    assert_eq!(region.as_str(), "us-east-1");
    assert_eq!(nameserver.query_count(), 1);
}

#[tokio::test]
async fn every_resolve_queries_the_nameserver() {
    let nameserver = ScriptedNameserver::start(vec![
        vec!["health.us-east-1.example."],
        vec!["health.us-west-2.example."],
    ])
    .await;
    let resolver = resolver_for(nameserver.addr, Duration::from_secs(2));

    let first = resolver.resolve().await.unwrap();
    let second = resolver.resolve().await.unwrap();

    assert_eq!(first.as_str(), "us-east-1");
    assert_eq!(second.as_str(), "us-west-2");
    assert_eq!(nameserver.query_count(), 2);
}

#[tokio::test]
async fn two_cnames_are_a_resolution_error() {
    let nameserver = ScriptedNameserver::start(vec![vec![
        "health.us-east-1.example.",
        "health.us-east-2.example.",
    ]])
    .await;
    let resolver = resolver_for(nameserver.addr, Duration::from_secs(2));

    let err = resolver.resolve().await.unwrap_err();
    assert!(err.is_resolution(), "unexpected error: {}", err);
}

#[tokio::test]
async fn silent_nameserver_times_out_as_resolution_error() {
    // Bound but never answers
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let resolver = resolver_for(silent.local_addr().unwrap(), Duration::from_millis(500));

    let err = resolver.resolve().await.unwrap_err();
    assert!(err.is_resolution(), "unexpected error: {}", err);

    drop(silent);
}
