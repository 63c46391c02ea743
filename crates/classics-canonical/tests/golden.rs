use classics_canonical::{canonicalize, dag_cbor, encode, generate_cid, Cid, Node};
use serde::Serialize;
use serde_json::json;

#[test]
fn null_and_empty_map_match_golden_cids() {
    assert_eq!(
        encode(&Node::Null).unwrap().cid.as_str(),
        "bafyreifqwkmiw256ojf2zws6tzjeonw6bpd5vza4i22ccpcq4hjv2ts7cm"
    );
    let empty = encode(&Node::Map(Vec::new())).unwrap();
    assert_eq!(
        empty.cid.as_str(),
        "bafyreigbtj4x7ip5legnfznufuopl4sg4knzc2cof6duas4b3q2fy6swua"
    );
    assert_eq!(empty.canonical_text, "{}");
}

#[test]
fn json_value_matches_golden_cid() {
    let result = generate_cid(&json!({"hello": "world"})).unwrap();
    assert_eq!(
        result.cid.to_string(),
        "bafyreidykglsfhoixmivffc5uwhcgshx4j465xwqntbmu43nb2dzqwfvae"
    );
    assert_eq!(hex::encode(result.canonical_binary().unwrap()), "a16568656c6c6f65776f726c64");
}

#[test]
fn field_order_does_not_change_cid() {
    let a = Node::map([
        ("make", Node::text("Honda")),
        ("model", Node::text("Civic")),
        ("year", Node::Int(2010)),
    ]);
    let b = Node::map([
        ("year", Node::Int(2010)),
        ("make", Node::text("Honda")),
        ("model", Node::text("Civic")),
    ]);
    let (ra, rb) = (encode(&a).unwrap(), encode(&b).unwrap());
    assert_eq!(ra, rb);
    assert!(ra.cid.as_str().starts_with("bafyrei"));
    assert_eq!(ra.cid.as_str().len(), 59);
}

#[test]
fn struct_and_equivalent_json_share_a_cid() {
    #[derive(Serialize)]
    struct Car<'a> {
        make: &'a str,
        model: &'a str,
        year: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<&'a str>,
    }

    let from_struct = generate_cid(&Car {
        make: "Honda",
        model: "Civic",
        year: 2010,
        color: None,
    })
    .unwrap();
    let from_json = generate_cid(&json!({"year": 2010, "model": "Civic", "make": "Honda"})).unwrap();
    assert_eq!(from_struct.cid, from_json.cid);
    assert_eq!(
        from_struct.canonical_text,
        r#"{"make":"Honda","year":2010,"model":"Civic"}"#
    );
}

#[test]
fn int_and_float_nodes_are_distinct() {
    let int = encode(&Node::map([("year", Node::Int(2010))])).unwrap();
    let float = encode(&Node::map([("year", Node::Float(2010.0))])).unwrap();
    assert_ne!(int.cid, float.cid);
    assert_eq!(hex::encode(int.canonical_binary().unwrap()), "a164796561721907da");
    assert_eq!(
        hex::encode(float.canonical_binary().unwrap()),
        "a16479656172fb409f680000000000"
    );
    assert_eq!(int.canonical_text, float.canonical_text);
}

#[test]
fn records_hash_numbers_as_floats() {
    let int = generate_cid(&json!({"year": 2010})).unwrap();
    let float = generate_cid(&json!({"year": 2010.0})).unwrap();
    assert_eq!(int, float);
    assert_eq!(
        int.cid.as_str(),
        "bafyreian3mzyzlrotnwewqw2qdlohsaocmgr5e7tlnplgjn2iq7szmjah4"
    );
    assert_eq!(int.canonical_binary_b64, "oWR5ZWFy+0CfaAAAAAAA");
    assert_eq!(int.canonical_text, r#"{"year":2010}"#);
}

#[test]
fn binary_decodes_back_to_the_same_tree() {
    let value = json!({
        "nested": {"list": [1, -2, 3.5, null, true], "text": "émoji 🚗"},
        "a": "b"
    });
    let node = canonicalize(&value).unwrap();
    let result = encode(&node).unwrap();
    let decoded = dag_cbor::decode(&result.canonical_binary().unwrap()).unwrap();
    assert_eq!(decoded, node);
    result.verify().unwrap();
}

#[test]
fn cid_parse_round_trips_display() {
    let cid = generate_cid(&json!({"k": 1})).unwrap().cid;
    assert_eq!(Cid::parse(cid.to_string()).unwrap(), cid);
}
