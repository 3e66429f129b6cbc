use crate::bookmarks::Bookmark;
use crate::config::BuildConfig;
use crate::graph::{build_graph, neighbors, BookmarkNode, Graph};

fn bmark(id: u64, url: &str, tags: &[&str], links: &[u64]) -> BookmarkNode {
    BookmarkNode::from_bookmark(&Bookmark {
        id,
        url: url.to_string(),
        title: format!("bookmark {id}"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        links: links.to_vec(),
        ..Default::default()
    })
}

fn build(nodes: Vec<BookmarkNode>, config: &BuildConfig) -> Graph {
    build_graph(nodes, config, |_| {}).unwrap()
}

fn same_site_pair() -> Vec<BookmarkNode> {
    vec![
        bmark(1, "https://x.com/a", &["py", "web"], &[]),
        bmark(2, "https://x.com/b", &["py", "db"], &[]),
    ]
}

#[test]
fn same_domain_and_partial_tag_overlap() {
    let graph = build(same_site_pair(), &BuildConfig::default());

    let weight = graph.edge(1, 2).unwrap();
    assert_eq!(weight.domain, 1.0);
    assert!((weight.tag - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(weight.direct_link, 0.0);
    assert_eq!(weight.indirect_link, 0.0);
    assert!((weight.total() - 1.667).abs() < 1e-3);
}

#[test]
fn threshold_prunes_pair_and_stats_skip_it() {
    let config = BuildConfig {
        min_edge_weight: 2.0,
        ..Default::default()
    };
    let graph = build(same_site_pair(), &config);

    assert!(graph.edge(1, 2).is_none());
    let stats = graph.stats();
    assert_eq!(stats.node_count, 2);
    assert_eq!(stats.edge_count, 0);
    assert_eq!(stats.isolated_nodes, 2);
}

#[test]
fn direct_link_dominates() {
    // nothing in common except the link
    let nodes = vec![
        bmark(1, "https://blog.example.org/post", &["life"], &[2]),
        bmark(2, "https://docs.python.org/3/", &["py"], &[]),
    ];
    let config = BuildConfig {
        min_edge_weight: 4.9,
        ..Default::default()
    };
    let graph = build(nodes, &config);

    let weight = graph.edge(1, 2).unwrap();
    assert_eq!(weight.direct_link, 5.0);
    assert!(weight.total() >= 5.0);
}

#[test]
fn link_direction_does_not_matter() {
    let forward = build(
        vec![bmark(1, "https://a.com", &[], &[2]), bmark(2, "https://b.com", &[], &[])],
        &BuildConfig::default(),
    );
    let backward = build(
        vec![bmark(1, "https://a.com", &[], &[]), bmark(2, "https://b.com", &[], &[1])],
        &BuildConfig::default(),
    );
    assert_eq!(forward.edge(1, 2), backward.edge(2, 1));
}

fn chain() -> Vec<BookmarkNode> {
    vec![
        bmark(1, "https://a.com", &[], &[2]),
        bmark(2, "https://b.org", &[], &[3]),
        bmark(3, "https://c.net", &[], &[]),
    ]
}

#[test]
fn two_hop_chain_gets_indirect_weight() {
    let config = BuildConfig {
        indirect_link_weight: 3.0,
        max_hops: 3,
        ..Default::default()
    };
    let graph = build(chain(), &config);

    let weight = graph.edge(1, 3).unwrap();
    assert_eq!(weight.indirect_link, 3.0);
    assert_eq!(weight.direct_link, 0.0);
    assert_eq!(weight.total(), 3.0);

    // directly linked pairs do not also collect the indirect bonus
    let direct = graph.edge(1, 2).unwrap();
    assert_eq!(direct.direct_link, 5.0);
    assert_eq!(direct.indirect_link, 0.0);
}

#[test]
fn indirect_links_respect_hop_limit_and_default_off() {
    let graph = build(chain(), &BuildConfig::default());
    assert!(graph.edge(1, 3).is_none());

    let longer = vec![
        bmark(1, "https://a.com", &[], &[2]),
        bmark(2, "https://b.org", &[], &[3]),
        bmark(3, "https://c.net", &[], &[4]),
        bmark(4, "https://d.io", &[], &[]),
    ];
    let config = BuildConfig {
        indirect_link_weight: 3.0,
        max_hops: 2,
        ..Default::default()
    };
    let graph = build(longer, &config);
    assert!(graph.edge(1, 3).is_some());
    assert!(graph.edge(1, 4).is_none());
}

#[test]
fn neighbors_on_built_graph() {
    let nodes = vec![
        bmark(1, "https://x.com/a", &["py", "web"], &[3]),
        bmark(2, "https://x.com/b", &["py", "db"], &[]),
        bmark(3, "https://y.com", &[], &[]),
        bmark(4, "https://z.com", &["py", "web"], &[]),
    ];
    let graph = build(nodes, &BuildConfig::default());

    let found = neighbors(&graph, 1, None, None).unwrap();
    let ids: Vec<u64> = found.iter().map(|n| n.id).collect();
    // link 5.0, identical tags 2.0, same site 1.667
    assert_eq!(ids, vec![3, 4, 2]);
    assert!(found.windows(2).all(|w| w[0].total >= w[1].total));

    let strong = neighbors(&graph, 1, None, Some(2.0)).unwrap();
    assert_eq!(strong.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 4]);
}

#[test]
fn subdomains_and_paths_raise_domain_weight() {
    let nodes = vec![
        bmark(1, "https://docs.example.com/guide/intro", &[], &[]),
        bmark(2, "https://docs.example.com/guide/setup", &[], &[]),
        bmark(3, "https://www.example.com/about", &[], &[]),
    ];
    let graph = build(nodes, &BuildConfig::default());

    let close = graph.edge(1, 2).unwrap().domain;
    let far = graph.edge(1, 3).unwrap().domain;
    assert!(close > far);
    assert_eq!(far, 1.0);
}
