//! Sample catalog
//!
//! Loaded by the `seed_books` binary and by the in-memory store at startup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Book, BookCreate};

struct SampleBook {
    title: &'static str,
    description: &'static str,
    price: i64,
    image: &'static str,
    stock: i32,
    author: &'static str,
}

const SAMPLE_BOOKS: &[SampleBook] = &[
    SampleBook {
        title: "The Art of React Programming",
        description: "Master modern React development with hooks, context, and best practices. Learn to build scalable applications with real-world examples and patterns.",
        price: 599,
        image: "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=400",
        stock: 50,
        author: "Sarah Johnson",
    },
    SampleBook {
        title: "JavaScript: The Complete Guide",
        description: "From basics to advanced concepts, this comprehensive guide covers ES6+, async programming, and modern JavaScript development techniques.",
        price: 799,
        image: "https://images.unsplash.com/photo-1544716278-ca5e3f4abd8c?w=400",
        stock: 45,
        author: "Michael Chen",
    },
    SampleBook {
        title: "Node.js Backend Mastery",
        description: "Build powerful backend applications with Node.js, Express, MongoDB, and learn authentication, APIs, and deployment strategies.",
        price: 699,
        image: "https://images.unsplash.com/photo-1532012197267-da84d127e765?w=400",
        stock: 30,
        author: "David Kumar",
    },
    SampleBook {
        title: "Full Stack Web Development",
        description: "Complete guide to building modern web applications covering frontend, backend, databases, and deployment. Includes MERN stack projects.",
        price: 999,
        image: "https://images.unsplash.com/photo-1589998059171-988d887df646?w=400",
        stock: 40,
        author: "Emily Williams",
    },
    SampleBook {
        title: "Python for Data Science",
        description: "Learn Python programming for data analysis, visualization, and machine learning. Includes pandas, NumPy, and scikit-learn.",
        price: 899,
        image: "https://images.unsplash.com/photo-1526379095098-d400fd0bf935?w=400",
        stock: 35,
        author: "Dr. Rajesh Sharma",
    },
    SampleBook {
        title: "MongoDB Database Design",
        description: "Master NoSQL database design, indexing, aggregation, and performance optimization with MongoDB and Mongoose.",
        price: 649,
        image: "https://images.unsplash.com/photo-1544383835-bda2bc66a55d?w=400",
        stock: 25,
        author: "Lisa Anderson",
    },
];

/// The sample catalog, stamped with `now`
pub fn sample_books(now: DateTime<Utc>) -> Vec<Book> {
    SAMPLE_BOOKS
        .iter()
        .map(|s| {
            BookCreate {
                title: s.title.to_string(),
                description: s.description.to_string(),
                price: Decimal::from(s.price),
                image: s.image.to_string(),
                stock: s.stock,
                author: s.author.to_string(),
            }
            .into_book(now)
        })
        .collect()
}
