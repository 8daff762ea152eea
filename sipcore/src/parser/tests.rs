//! RFC 4475 torture messages, run through the full message parser.

use crate::message::Message;

fn parse(msg: &str) -> crate::Result<Message> {
    Message::parse(msg.as_bytes())
}

fn parse_err(msg: &str) -> String {
    parse(msg).unwrap_err().to_string()
}

// 3.1.1.1.  A Short Tortuous INVITE
#[test]
fn test_torture_wsinv() {
    let msg = concat!(
        "INVITE sip:vivekg@chair-dnrc.example.com;unknownparam SIP/2.0\r\n",
        "TO :\r\n sip:vivekg@chair-dnrc.example.com ;   tag    = 1918181833n\r\n",
        "from   : \"J Rosenberg \\\\\\\"\"       <sip:jdrosen@example.com>\r\n",
        "  ;\r\n",
        "  tag = 98asjd8\r\n",
        "MaX-fOrWaRdS: 0068\r\n",
        "Call-ID: wsinv.ndaksdj@192.0.2.1\r\n",
        "Content-Length   : 150\r\n",
        "cseq: 0009\r\n",
        "  INVITE\r\n",
        "Via  : SIP  /   2.0\r\n",
        " /UDP\r\n",
        "    192.0.2.2;branch=390skdjuw\r\n",
        "s :\r\n",
        "NewFangledHeader:   newfangled value\r\n",
        " continued newfangled value\r\n",
        "UnknownHeaderWithUnusualValue: ;;,,;;,;\r\n",
        "Content-Type: application/sdp\r\n",
        "Route:\r\n",
        " <sip:services.example.com;lr;unknownwith=value;unknown-no-value>\r\n",
        "v:  SIP  / 2.0  / TCP     spindle.example.com   ;\r\n",
        "  branch  =   z9hG4bK9ikj8  ,\r\n",
        " SIP  /    2.0   / UDP  192.168.255.111   ; branch=\r\n",
        " z9hG4bK30239\r\n",
        "m:\"Quoted string \\\"\\\"\" <sip:jdrosen@example.com> ; newparam =\r\n",
        "      newvalue ;\r\n",
        "  secondparam ; q = 0.33\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    assert!(msg.is_request());
    assert_eq!(
        msg.request_uri().unwrap().as_str(),
        "sip:vivekg@chair-dnrc.example.com;unknownparam"
    );

    let to = msg.to().unwrap();
    assert_eq!(to.addr(), "sip:vivekg@chair-dnrc.example.com");
    assert_eq!(to.tag(), Some("1918181833n"));

    let from = msg.from().unwrap();
    assert_eq!(from.display_name(), "\"J Rosenberg \\\\\\\"\"");
    assert_eq!(from.addr(), "sip:jdrosen@example.com");
    assert_eq!(from.tag(), Some("98asjd8"));

    assert_eq!(msg.max_forwards(), Some(68));
    assert_eq!(msg.cseq().unwrap().number(), 9);
    assert_eq!(msg.cseq().unwrap().method(), "INVITE");
    assert_eq!(msg.vias().count(), 3);
    assert_eq!(msg.routes().count(), 1);
    assert!(msg.is_sdp());

    let contacts = msg.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts.first().unwrap().addr(), "sip:jdrosen@example.com");

    let headers = msg.headers();
    assert_eq!(headers.find_by_name("s").unwrap().value(), "");
    assert_eq!(
        headers.find_by_name("NewFangledHeader").unwrap().value(),
        "newfangled value\r\n continued newfangled value"
    );
    assert_eq!(
        headers.find_by_name("UnknownHeaderWithUnusualValue").unwrap().value(),
        ";;,,;;,;"
    );
    assert_eq!(headers.find_by_name("Content-type").unwrap().value(), "application/sdp");
    assert_eq!(headers.find_by_name("CSeq").unwrap().value(), "0009\r\n  INVITE");
    assert_eq!(headers.len(), 14);
}

// 3.1.1.2.  Wide Range of Valid Characters
#[test]
fn test_torture_intmeth() {
    let msg = concat!(
        "!interesting-Method0123456789_*+`.%indeed'~ ",
        "sip:1_unusual.URI~(to-be!sure)&isn't+it$/crazy?,/;;*",
        ":&it+has=1,weird!*pas$wo~d_too.(doesn't-it)",
        "@example.com SIP/2.0\r\n",
        "Via: SIP/2.0/TCP host1.example.com;branch=z9hG4bK-.!%66*_+`'~\r\n",
        "To: \"BEL:\\\x07 NUL:\\\x00 DEL:\\\x7F\" ",
        "<sip:1_unusual.URI~(to-be!sure)&isn't+it$/crazy?,/;;*@example.com>\r\n",
        "From: token1~` token2'+_ token3*%!.- <sip:mundane@example.com>",
        ";fromParam''~+*_!.-%=\"работающий\"",
        ";tag=_token~1'+`*%!-.\r\n",
        "Call-ID: intmeth.word%ZK-!.*_+'@word`~)(><:\\/\"][?}{\r\n",
        "CSeq: 139122385 !interesting-Method0123456789_*+`.%indeed'~\r\n",
        "Max-Forwards: 255\r\n",
        "extensionHeader-!.%*+_`'~:\u{feff}大停電\r\n",
        "Content-Length: 0\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    assert!(msg.is_request());
    assert_eq!(msg.method(), Some("!interesting-Method0123456789_*+`.%indeed'~"));

    let uri = msg.request_uri().unwrap();
    assert_eq!(uri.user(), "1_unusual.URI~(to-be!sure)&isn't+it$/crazy?,/;;*");
    assert_eq!(uri.password(), "&it+has=1,weird!*pas$wo~d_too.(doesn't-it)");
    assert_eq!(uri.host(), "example.com");

    assert_eq!(msg.to().unwrap().display_name(), "\"BEL:\\\x07 NUL:\\\x00 DEL:\\\x7F\"");

    let from = msg.from().unwrap();
    assert_eq!(from.display_name(), "token1~` token2'+_ token3*%!.-");
    assert_eq!(from.param("fromParam''~+*_!.-%"), Some("работающий"));
    assert_eq!(from.tag(), Some("_token~1'+`*%!-."));

    assert_eq!(msg.call_id().unwrap().as_str(), "intmeth.word%ZK-!.*_+'@word`~)(><:\\/\"][?}{");
    assert_eq!(msg.vias().next().unwrap().branch(), Some("z9hG4bK-.!%66*_+`'~"));

    let headers = msg.headers();
    assert_eq!(
        headers.find_by_name("extensionHeader-!.%*+_`'~").unwrap().value(),
        "\u{feff}大停電"
    );
    assert_eq!(
        headers.find_by_name("cseq").unwrap().value(),
        "139122385 !interesting-Method0123456789_*+`.%indeed'~"
    );
    assert_eq!(headers.find_by_name("content-length").unwrap().value(), "0");
    assert_eq!(headers.len(), 8);
}

// 3.1.1.3.  Valid Use of the % Escaping Mechanism
#[test]
fn test_torture_esc01() {
    let msg = concat!(
        "INVITE sip:sips%3Auser%40example.com@example.net SIP/2.0\r\n",
        "To: sip:%75se%72@example.com\r\n",
        "From: <sip:I%20have%20spaces@example.net>;tag=938\r\n",
        "Max-Forwards: 87\r\n",
        "i: esc01.239409asdfakjkn23onasd0-3234\r\n",
        "CSeq: 234234 INVITE\r\n",
        "Via: SIP/2.0/UDP host5.example.net;branch=z9hG4bKkdjuw\r\n",
        "C: application/sdp\r\n",
        "Contact:\r\n",
        "  <sip:cal%6Cer@host5.example.net;%6C%72;n%61me=v%61lue%25%34%31>\r\n",
        "Content-Length: 150\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    assert_eq!(msg.request_uri().unwrap().user(), "sips%3Auser%40example.com");
    assert_eq!(msg.to().unwrap().uri().unwrap().user(), "%75se%72");
    assert_eq!(msg.from().unwrap().uri().unwrap().user(), "I%20have%20spaces");
    assert_eq!(msg.call_id().unwrap().as_str(), "esc01.239409asdfakjkn23onasd0-3234");
    assert!(msg.is_sdp());

    let contact = msg.contacts().first().unwrap().uri().unwrap();
    assert_eq!(contact.param("%6C%72"), Some(""));
    assert_eq!(contact.param("n%61me"), Some("v%61lue%25%34%31"));
}

// 3.1.1.4.  Escaped Nulls in URIs
#[test]
fn test_torture_escnull() {
    let msg = concat!(
        "REGISTER sip:example.com SIP/2.0\r\n",
        "To: sip:null-%00-null@example.com\r\n",
        "From: sip:null-%00-null@example.com;tag=839923423\r\n",
        "Max-Forwards: 70\r\n",
        "Call-ID: escnull.39203ndfvkjdasfkq3w4otrq0adsfdfnavd\r\n",
        "CSeq: 14398234 REGISTER\r\n",
        "Via: SIP/2.0/UDP host5.example.com;branch=z9hG4bKkdjuw\r\n",
        "Contact: <sip:%00@host5.example.com>\r\n",
        "Contact: <sip:%00%00@host5.example.com>\r\n",
        "L:0\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    assert_eq!(msg.to().unwrap().uri().unwrap().user(), "null-%00-null");
    assert_eq!(msg.contacts().len(), 2);
    assert_eq!(msg.content_length(), Some(0));
}

// 3.1.1.6.  Message with No LWS between Display Name and <
#[test]
fn test_torture_lwsdisp() {
    let msg = concat!(
        "OPTIONS sip:user@example.com SIP/2.0\r\n",
        "To: sip:user@example.com\r\n",
        "From: caller<sip:caller@example.com>;tag=323\r\n",
        "Max-Forwards: 70\r\n",
        "Call-ID: lwsdisp.1234abcd@funky.example.com\r\n",
        "CSeq: 60 OPTIONS\r\n",
        "Via: SIP/2.0/UDP funky.example.com;branch=z9hG4bKkdjuw\r\n",
        "l: 0\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    let from = msg.from().unwrap();
    assert_eq!(from.display_name(), "caller");
    assert_eq!(from.addr(), "sip:caller@example.com");
    assert_eq!(from.tag(), Some("323"));
}

// 3.1.1.7.  Long Values in Header Fields
#[test]
fn test_torture_longreq() {
    let mut msg = String::from("INVITE sip:user@example.com SIP/2.0\r\n");
    msg += &format!(
        "To: \"I have a user name of {} proportion\"<sip:user@example.com:6000;\
         unknownparam1=very{}value;longparam{}=shortvalue;very{}ParameterNameWithNoValue>\r\n",
        "extreme".repeat(10),
        "long".repeat(20),
        "name".repeat(25),
        "long".repeat(25),
    );
    msg += &format!(
        "F: sip:{}@example.net;tag=12{}424;unknownheaderparam{}=unknowheaderparam{};unknownValueless{}\r\n",
        "amazinglylongcallername".repeat(5),
        "982".repeat(50),
        "name".repeat(20),
        "value".repeat(15),
        "paramname".repeat(10),
    );
    msg += &format!("Call-ID: longreq.one{}longcallid\r\n", "really".repeat(20));
    msg += "CSeq: 3882340 INVITE\r\n";
    msg += &format!(
        "Unknown-{0}-Name:unknown-{1}-value;unknown-{1}-parameter-name =unknown-{1}-parameter-value\r\n",
        "Long".repeat(20),
        "long".repeat(20),
    );
    for (i, name) in ["Via", "v", "V", "Via", "ViA", "VIa", "VIA", "via", "viA", "vIa", "vIA"]
        .iter()
        .enumerate()
    {
        msg += &format!("{name}: SIP/2.0/TCP sip{}.example.com\r\n", 33 - i);
    }
    for (i, name) in ["V :", "v :", "V  :", "v  :", "Via :", "Via  :"].iter().enumerate() {
        msg += &format!("{name}  SIP/2.0/TCP sip{}.example.com\r\n", 22 - i);
    }
    for n in (1..=16).rev() {
        msg += &format!("Via: SIP/2.0/TCP sip{n}.example.com\r\n");
    }
    msg += &format!(
        "Via: SIP/2.0/TCP host.example.com;received=192.0.2.5;branch=very{}branchvalue\r\n",
        "long".repeat(50)
    );
    msg += "Max-Forwards: 70\r\n";
    msg += &format!(
        "Contact: <sip:{}@host5.example.net>\r\n",
        "amazinglylongcallername".repeat(5)
    );
    msg += "Content-Type: application/sdp\r\n";
    msg += "l: 150\r\n\r\n";

    let msg = parse(&msg).unwrap();

    assert_eq!(msg.vias().count(), 34);
    assert_eq!(msg.vias().next().unwrap().host(), "sip33.example.com");
    assert_eq!(msg.contacts().len(), 1);
    assert_eq!(
        msg.call_id().unwrap().as_str(),
        format!("longreq.one{}longcallid", "really".repeat(20))
    );
    assert_eq!(msg.to().unwrap().uri().unwrap().port(), Some(6000));
    assert_eq!(msg.from().unwrap().tag(), Some(format!("12{}424", "982".repeat(50)).as_str()));
    assert_eq!(msg.content_length(), Some(150));
}

// 3.1.1.9.  Semicolon-Separated Parameters in URI User Part
#[test]
fn test_torture_semiuri() {
    let msg = concat!(
        "OPTIONS sip:user;par=u%40example.net@example.com SIP/2.0\r\n",
        "To: sip:j_user@example.com\r\n",
        "From: sip:caller@example.org;tag=33242\r\n",
        "Max-Forwards: 3\r\n",
        "Call-ID: semiuri.0ha0isndaksdj\r\n",
        "CSeq: 8 OPTIONS\r\n",
        "Accept: application/sdp, application/pkcs7-mime,\r\n",
        "        multipart/mixed, multipart/signed,\r\n",
        "        message/sip, message/sipfrag\r\n",
        "Via: SIP/2.0/UDP 192.0.2.1;branch=z9hG4bKkdjuw\r\n",
        "l: 0\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    let uri = msg.request_uri().unwrap();
    assert_eq!(uri.user(), "user;par=u%40example.net");
    assert_eq!(uri.host(), "example.com");
    assert_eq!(uri.param("par"), None);

    let headers = msg.headers();
    assert_eq!(
        headers.find_by_name("accept").unwrap().value(),
        "application/sdp, application/pkcs7-mime,\r\n        multipart/mixed, multipart/signed,\r\n        message/sip, message/sipfrag"
    );
    assert_eq!(headers.find_by_name("CSeq").unwrap().value(), "8 OPTIONS");
    assert_eq!(headers.find_by_name("Content-Length").unwrap().value(), "0");
    assert_eq!(headers.len(), 8);
}

// 3.1.1.12.  Unusual Reason Phrase
#[test]
fn test_torture_unreason() {
    let msg = concat!(
        "SIP/2.0 200 = 2**3 * 5**2 но сто девяносто девять - простое\r\n",
        "Via: SIP/2.0/UDP 192.0.2.198;branch=z9hG4bK1324923\r\n",
        "Call-ID: unreason.1234ksdfak3j2erwedfsASdf\r\n",
        "CSeq: 35 INVITE\r\n",
        "From: sip:user@example.com;tag=11141343\r\n",
        "To: sip:user@example.edu;tag=2229\r\n",
        "Content-Length: 154\r\n",
        "Content-Type: application/sdp\r\n",
        "Contact: <sip:user@host198.example.com>\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    assert!(msg.is_response());
    assert_eq!(msg.status_code(), Some(200));
    assert_eq!(msg.reason(), Some("= 2**3 * 5**2 но сто девяносто девять - простое"));
}

// 3.1.1.13.  Empty Reason Phrase
#[test]
fn test_torture_noreason() {
    let msg = concat!(
        "SIP/2.0 100 \r\n",
        "Via: SIP/2.0/UDP 192.0.2.105;branch=z9hG4bK2398ndaoe\r\n",
        "Call-ID: noreason.asndj203insdf99223ndf\r\n",
        "CSeq: 35 INVITE\r\n",
        "From: <sip:user@example.com>;tag=39ansfi3\r\n",
        "To: <sip:user@example.edu>;tag=902jndnke3\r\n",
        "Content-Length: 0\r\n",
        "Contact: <sip:user@host105.example.com>\r\n",
        "\r\n",
    );
    let msg = parse(msg).unwrap();

    assert!(msg.is_response());
    assert_eq!(msg.status_code(), Some(100));
    assert_eq!(msg.reason(), Some(""));
}

// 3.1.2.1.  Extraneous Header Field Separators
#[test]
fn test_torture_badinv01() {
    let msg = concat!(
        "INVITE sip:user@example.com SIP/2.0\r\n",
        "To: sip:j.user@example.com\r\n",
        "From: sip:caller@example.net;tag=134161461246\r\n",
        "Max-Forwards: 7\r\n",
        "Call-ID: badinv01.0ha0isndaksdjasdf3234nas\r\n",
        "CSeq: 8 INVITE\r\n",
        "Via: SIP/2.0/UDP 192.0.2.15;;,;,,\r\n",
        "Contact: \"Joe\" <sip:joe@example.org>;;;;\r\n",
        "Content-Length: 152\r\n",
        "Content-Type: application/sdp\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("Via: SIP/2.0/UDP 192.0.2.15;;,;"));
}

// 3.1.2.3.  Negative Content-Length
#[test]
fn test_torture_ncl() {
    let msg = concat!(
        "INVITE sip:user@example.com SIP/2.0\r\n",
        "Max-Forwards: 254\r\n",
        "To: sip:j.user@example.com\r\n",
        "From: sip:caller@example.net;tag=32394234\r\n",
        "Call-ID: ncl.0ha0isndaksdj2193423r542w35\r\n",
        "CSeq: 0 INVITE\r\n",
        "Via: SIP/2.0/UDP 192.0.2.53;branch=z9hG4bKkdjuw\r\n",
        "Contact: <sip:caller@example53.example.net>\r\n",
        "Content-Type: application/sdp\r\n",
        "Content-Length: -999\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("Content-Length: -999"));
}

// 3.1.2.4.  Request Scalar Fields with Overlarge Values
#[test]
fn test_torture_scalar02() {
    let msg = concat!(
        "REGISTER sip:example.com SIP/2.0\r\n",
        "Via: SIP/2.0/TCP host129.example.com;branch=z9hG4bK342sdfoi3\r\n",
        "To: <sip:user@example.com>\r\n",
        "From: <sip:user@example.com>;tag=239232jh3\r\n",
        "CSeq: 36893488147419103232 REGISTER\r\n",
        "Call-ID: scalar02.23o0pd9vanlq3wnrlnewofjas9ui32\r\n",
        "Max-Forwards: 300\r\n",
        "Expires: 1000000000000000000000000000000000000000000\r\n",
        "Contact: <sip:user@host129.example.com>;expires=280297596632815\r\n",
        "Content-Length: 0\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("CSeq: 36893488147419103232 REGISTER"));
}

// 3.1.2.6.  Unterminated Quoted String in Display Name
#[test]
fn test_torture_quotbal() {
    let msg = concat!(
        "INVITE sip:user@example.com SIP/2.0\r\n",
        "To: \"Mr. J. User <sip:j.user@example.com>\r\n",
        "From: sip:caller@example.net;tag=93334\r\n",
        "Max-Forwards: 10\r\n",
        "Call-ID: quotbal.aksdj\r\n",
        "Contact: <sip:caller@host59.example.net>\r\n",
        "CSeq: 8 INVITE\r\n",
        "Via: SIP/2.0/UDP 192.0.2.59:5050;branch=z9hG4bKkdjuw39234\r\n",
        "Content-Type: application/sdp\r\n",
        "Content-Length: 152\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("To: \"Mr. J. User <sip"));
}

// 3.1.2.7.  <> Enclosing Request-URI
#[test]
fn test_torture_ltgtruri() {
    let msg = concat!(
        "INVITE <sip:user@example.com> SIP/2.0\r\n",
        "To: sip:user@example.com\r\n",
        "From: sip:caller@example.net;tag=39291\r\n",
        "Max-Forwards: 23\r\n",
        "Call-ID: ltgtruri.1@192.0.2.5\r\n",
        "CSeq: 1 INVITE\r\n",
        "Via: SIP/2.0/UDP 192.0.2.5\r\n",
        "Contact: <sip:caller@host5.example.net>\r\n",
        "Content-Type: application/sdp\r\n",
        "Content-Length: 159\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("INVITE <sip:user@example.com> SIP/2.0"));
}

// 3.1.2.8.  Malformed SIP Request-URI (embedded LWS)
#[test]
fn test_torture_lwsruri() {
    let msg = concat!(
        "INVITE sip:user@example.com; lr SIP/2.0\r\n",
        "To: sip:user@example.com;tag=3xfe-9921883-z9f\r\n",
        "From: sip:caller@example.net;tag=231413434\r\n",
        "Max-Forwards: 5\r\n",
        "Call-ID: lwsruri.asdfasdoeoi2323-asdfwrn23-asd834rk423\r\n",
        "CSeq: 2130706432 INVITE\r\n",
        "Via: SIP/2.0/UDP 192.0.2.1:5060;branch=z9hG4bKkdjuw2395\r\n",
        "Contact: <sip:caller@host1.example.net>\r\n",
        "Content-Type: application/sdp\r\n",
        "Content-Length: 159\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("INVITE sip:user@example.com; lr SIP/2.0"));
}

// 3.1.2.9.  Multiple SP Separating Request-Line Elements
#[test]
fn test_torture_lwsstart() {
    let msg = concat!(
        "INVITE  sip:user@example.com  SIP/2.0\r\n",
        "Max-Forwards: 8\r\n",
        "To: sip:user@example.com\r\n",
        "From: sip:caller@example.net;tag=8814\r\n",
        "Call-ID: lwsstart.dfknq234oi243099adsdfnawe3@example.com\r\n",
        "CSeq: 1893884 INVITE\r\n",
        "Via: SIP/2.0/UDP host1.example.com;branch=z9hG4bKkdjuw3923\r\n",
        "Contact: <sip:caller@host1.example.net>\r\n",
        "Content-Type: application/sdp\r\n",
        "Content-Length: 150\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("INVITE  sip:user@example.com  SIP/2.0"));
}

// 3.1.2.10.  SP Characters at End of Request-Line
#[test]
fn test_torture_trws() {
    let msg = concat!(
        "OPTIONS sip:remote-target@example.com SIP/2.0  \r\n",
        "Via: SIP/2.0/TCP host1.example.com;branch=z9hG4bK299342093\r\n",
        "To: <sip:remote-target@example.com>\r\n",
        "From: <sip:local-resource@example.com>;tag=329429089\r\n",
        "Call-ID: trws.oicu34958239neffasdhr2345r\r\n",
        "Accept: application/sdp\r\n",
        "CSeq: 238923 OPTIONS\r\n",
        "Max-Forwards: 70\r\n",
        "Content-Length: 0\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("OPTIONS sip:remote-target@example.com SIP/2.0  "));
}

// 3.1.2.14.  Spaces within addr-spec
#[test]
fn test_torture_badaspec() {
    let msg = concat!(
        "OPTIONS sip:user@example.org SIP/2.0\r\n",
        "Via: SIP/2.0/UDP host4.example.com:5060;branch=z9hG4bKkdju43234\r\n",
        "Max-Forwards: 70\r\n",
        "From: \"Bell, Alexander\" <sip:a.g.bell@example.com>;tag=433423\r\n",
        "To: \"Watson, Thomas\" < sip:t.watson@example.org >\r\n",
        "Call-ID: badaspec.sdf0234n2nds0a099u23h3hnnw009cdkne3\r\n",
        "Accept: application/sdp\r\n",
        "CSeq: 3923239 OPTIONS\r\n",
        "l: 0\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("< sip:t.watson@example.org >"));
}

// 3.1.2.15.  Non-token Characters in Display Name
#[test]
fn test_torture_baddn() {
    let msg = concat!(
        "OPTIONS sip:t.watson@example.org SIP/2.0\r\n",
        "Via:     SIP/2.0/UDP c.example.com:5060;branch=z9hG4bKkdjuw\r\n",
        "Max-Forwards:      70\r\n",
        "From:    Bell, Alexander <sip:a.g.bell@example.com>;tag=43\r\n",
        "To:      Watson, Thomas <sip:t.watson@example.org>\r\n",
        "Call-ID: baddn.31415@c.example.com\r\n",
        "Accept: application/sdp\r\n",
        "CSeq:    3923239 OPTIONS\r\n",
        "l: 0\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("From:    Bell, Alexander <sip"));
}

// 3.1.2.16.  Unknown Protocol Version
#[test]
fn test_torture_badvers() {
    let msg = concat!(
        "OPTIONS sip:t.watson@example.org SIP/7.0\r\n",
        "Via:     SIP/7.0/UDP c.example.com;branch=z9hG4bKkdjuw\r\n",
        "Max-Forwards:     70\r\n",
        "From:    A. Bell <sip:a.g.bell@example.com>;tag=qweoiqpe\r\n",
        "To:      T. Watson <sip:t.watson@example.org>\r\n",
        "Call-ID: badvers.31417@c.example.com\r\n",
        "CSeq:    1 OPTIONS\r\n",
        "l: 0\r\n",
        "\r\n",
    );

    assert!(parse_err(msg).contains("OPTIONS sip:t.watson@example.org SIP/7.0"));
}
