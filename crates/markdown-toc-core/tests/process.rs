use markdown_toc_config::TocSettings;
use markdown_toc_core::{process, RegionKind, TocOptions};
use markdown_toc_test_support::tight_settings;
use pretty_assertions::assert_eq;

fn tight() -> TocOptions {
    TocOptions::from_settings(&tight_settings()).expect("valid settings")
}

fn loose() -> TocOptions {
    TocOptions::from_settings(&TocSettings::default()).expect("valid settings")
}

const GUIDE: &str = "\
---
title: Guide
---
# Guide

Intro paragraph.

<!-- toc -->
- [Stale](#stale)
<!-- tocstop -->

## Install

```sh
# not a heading
```

### From source

## Usage

Usage
-----

## FAQ
";

#[test]
fn marker_block_is_refreshed_in_place() {
    let outcome = process(GUIDE, &tight());

    assert_eq!(outcome.region, Some(RegionKind::Markers));
    assert_eq!(outcome.previous.len(), 1);
    assert_eq!(outcome.previous[0].anchor, "stale");

    let expected_block = "<!-- toc -->
- [Install](#install)
  - [From source](#from-source)
- [Usage](#usage)
- [Usage](#usage-1)
- [FAQ](#faq)
<!-- tocstop -->
";
    assert!(
        outcome.contents.contains(expected_block),
        "unexpected output:\n{}",
        outcome.contents
    );
}

#[test]
fn content_outside_the_region_is_preserved() {
    let outcome = process(GUIDE, &tight());
    let start = GUIDE.find("<!-- toc -->").unwrap();
    let end = GUIDE.find("<!-- tocstop -->").unwrap();
    let out_end = outcome.contents.find("<!-- tocstop -->").unwrap();

    assert_eq!(&outcome.contents[..start], &GUIDE[..start]);
    assert_eq!(&outcome.contents[out_end..], &GUIDE[end..]);
}

#[test]
fn loose_lists_separate_items_with_blank_lines() {
    let outcome = process("# Title\n\n## A\n\n### A.1\n\n## B\n", &loose());
    assert_eq!(
        outcome.contents,
        "# Title\n\n## Table of Contents\n\n- [A](#a)\n\n  - [A.1](#a1)\n\n- [B](#b)\n\n## A\n\n### A.1\n\n## B\n"
    );
    assert!(!process(&outcome.contents, &loose()).changed);
}

#[test]
fn switching_spacing_rewrites_only_the_list() {
    let tight_doc = process("# Title\n\n## A\n\n## B\n", &tight()).contents;
    let loose_doc = process(&tight_doc, &loose()).contents;
    assert_eq!(
        loose_doc,
        "# Title\n\n## Table of Contents\n\n- [A](#a)\n\n- [B](#b)\n\n## A\n\n## B\n"
    );
    assert_eq!(process(&loose_doc, &tight()).contents, tight_doc);
}

#[test]
fn existing_toc_heading_is_refreshed_and_excluded() {
    let doc = "# Project\n\n## Contents\n\n- [Old](#old)\n\n## Build\n\n## Test\n";
    let outcome = process(doc, &tight());
    assert_eq!(outcome.region, Some(RegionKind::Heading));
    assert_eq!(
        outcome.contents,
        "# Project\n\n## Contents\n\n- [Build](#build)\n- [Test](#test)\n\n## Build\n\n## Test\n"
    );
}

#[test]
fn headings_before_the_toc_are_listed_too() {
    let doc = "## Summary\n\n## TOC\n\n## Details\n";
    let outcome = process(doc, &tight());
    assert_eq!(
        outcome.contents,
        "## Summary\n\n## TOC\n\n- [Summary](#summary)\n- [Details](#details)\n\n## Details\n"
    );
}

#[test]
fn depth_window_and_skip_pattern_filter_entries() {
    let settings = TocSettings {
        tight: true,
        max_depth: 3,
        skip: Some("changelog".into()),
        ..TocSettings::default()
    };
    let options = TocOptions::from_settings(&settings).unwrap();
    let doc = "# T\n\n## A\n\n### B\n\n#### C\n\n## Changelog\n";
    let outcome = process(doc, &options);
    let texts: Vec<_> = outcome.items.iter().map(|item| item.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B"]);
}

#[test]
fn inline_markup_is_flattened_in_links() {
    let doc = "# T\n\n## Using `cargo` with **care**\n\n## See [docs](https://example.com)\n";
    let outcome = process(doc, &tight());
    assert!(outcome
        .contents
        .contains("- [Using cargo with care](#using-cargo-with-care)\n- [See docs](#see-docs)\n"));
}

#[test]
fn crlf_documents_keep_their_line_endings_outside_the_toc() {
    let doc = "# T\r\n\r\n<!-- toc -->\r\n<!-- tocstop -->\r\n\r\n## A\r\n";
    let outcome = process(doc, &tight());
    assert_eq!(
        outcome.contents,
        "# T\r\n\r\n<!-- toc -->\r\n- [A](#a)\n<!-- tocstop -->\r\n\r\n## A\r\n"
    );
    assert!(!process(&outcome.contents, &tight()).changed);
}

fn assert_only_section_body_replaced(
    doc: &str,
    heading_line: &str,
    next_heading: &str,
    body: &str,
) {
    let outcome = process(doc, &tight());
    assert_eq!(outcome.region, Some(RegionKind::Heading));

    let prefix_end = doc.find(heading_line).expect("toc heading") + heading_line.len();
    let suffix_start = doc.find(next_heading).expect("next heading");
    let expected = format!("{}{body}{}", &doc[..prefix_end], &doc[suffix_start..]);
    assert_eq!(outcome.contents, expected);
    assert!(!process(&outcome.contents, &tight()).changed);
}

#[test]
fn atx_toc_section_with_prose_and_nested_list_is_fully_replaced() {
    let doc = "\
# Handbook

Welcome text stays.

## Table of Contents

Old prose inside the section.

- [Gone](#gone)
  - [Nested gone](#nested-gone)

## Setup

Setup text stays.

### Linux

## Run
";
    assert_only_section_body_replaced(
        doc,
        "## Table of Contents\n",
        "## Setup\n",
        "\n- [Setup](#setup)\n  - [Linux](#linux)\n- [Run](#run)\n\n",
    );
    let outcome = process(doc, &tight());
    assert_eq!(outcome.previous.len(), 2);
    assert!(!outcome.contents.contains("Old prose"));
}

#[test]
fn setext_toc_heading_keeps_surrounding_bytes() {
    let doc = "\
Handbook
========

Intro.

Contents
--------
stale line
1. [Old](#old)

## Build

Trailing text.
";
    assert_only_section_body_replaced(
        doc,
        "Contents\n--------\n",
        "## Build\n",
        "\n- [Build](#build)\n\n",
    );
}

#[test]
fn numbered_and_dashed_headings_keep_their_markers() {
    let doc = "# T\n\n## 1. Introduction\n\n## 2) Setup\n\n## - Dash\n\n## > Quote\n";
    let outcome = process(doc, &tight());
    assert!(
        outcome.contents.contains(
            "- [1. Introduction](#1-introduction)\n- [2) Setup](#2-setup)\n- [- Dash](#--dash)\n- [> Quote](#-quote)\n"
        ),
        "unexpected output:\n{}",
        outcome.contents
    );
}

#[test]
fn anchors_match_github_for_spaced_punctuation() {
    let doc = "# T\n\n## Foo - Bar\n\n## A & B\n\n## Foo - Bar\n";
    let outcome = process(doc, &tight());
    let anchors: Vec<_> = outcome.items.iter().map(|item| item.anchor.as_str()).collect();
    assert_eq!(anchors, vec!["foo---bar", "a--b", "foo---bar-1"]);
}

#[test]
fn later_top_level_parts_are_listed() {
    let doc = "# Book\n\nPreface.\n\n# Part One\n\n## Chapter\n\n# Part Two\n";
    let outcome = process(doc, &tight());
    assert_eq!(
        outcome.contents,
        "# Book\n\nPreface.\n\n# Table of Contents\n\n- [Part One](#part-one)\n  - [Chapter](#chapter)\n- [Part Two](#part-two)\n\n# Part One\n\n## Chapter\n\n# Part Two\n"
    );
}
